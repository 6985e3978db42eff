use async_trait::async_trait;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use triage_core::agent::{Agent, AgentError, AgentReply, Payload};
use triage_core::config::TriageConfig;
use triage_core::roster::default_roster;
use triage_core::{Batch, Record, TokenUsage, TriageError, partition};
use triage_execution::{BatchDispatcher, run_with};
use triage_infrastructure::read_message_log;
use triage_interaction::{AutoReply, Termination};

/// Test agent whose behaviour depends on which batch the transcript belongs to.
///
/// `rules` are checked in order against the turn prompt; the first marker
/// found decides the delay and whether the call fails.
struct ScriptedAgent {
    rules: Vec<Rule>,
    reply: String,
    calls: AtomicUsize,
}

struct Rule {
    marker: &'static str,
    delay: Duration,
    fail: bool,
}

impl Rule {
    fn delay(marker: &'static str, millis: u64) -> Self {
        Self {
            marker,
            delay: Duration::from_millis(millis),
            fail: false,
        }
    }

    fn fail(marker: &'static str, millis: u64) -> Self {
        Self {
            marker,
            delay: Duration::from_millis(millis),
            fail: true,
        }
    }
}

impl ScriptedAgent {
    fn new(reply: &str, rules: Vec<Rule>) -> Self {
        Self {
            rules,
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn expertise(&self) -> &str {
        "scripted test agent"
    }

    async fn execute(&self, payload: Payload) -> Result<AgentReply, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rule = self
            .rules
            .iter()
            .find(|rule| payload.as_text().contains(rule.marker));

        if let Some(rule) = rule {
            tokio::time::sleep(rule.delay).await;
            if rule.fail {
                return Err(AgentError::ProcessError {
                    status_code: Some(503),
                    message: "upstream unavailable".to_string(),
                    is_retryable: true,
                    retry_after: None,
                });
            }
        }

        Ok(AgentReply::new(self.reply.clone()).with_usage(TokenUsage {
            prompt_tokens: 120,
            completion_tokens: 30,
        }))
    }
}

fn records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::new(vec![
                ("query_id".to_string(), i.to_string()),
                ("question".to_string(), format!("question {i}")),
            ])
        })
        .collect()
}

fn dispatcher(
    agent: Arc<dyn Agent>,
    termination: Termination,
    auto_reply: &str,
) -> BatchDispatcher {
    BatchDispatcher::new(
        agent,
        default_roster(),
        termination,
        Arc::new(AutoReply::new(auto_reply)),
    )
    .unwrap()
}

fn batch_ranges(batches: &[Batch<Record>]) -> Vec<(usize, usize)> {
    batches.iter().map(Batch::range).collect()
}

#[tokio::test(start_paused = true)]
async fn output_follows_batch_order_not_completion_order() {
    // Later batches answer faster, so they finish first.
    let agent = Arc::new(ScriptedAgent::new(
        "handled",
        vec![
            Rule::delay("queries 0 to", 30),
            Rule::delay("queries 1000 to", 20),
            Rule::delay("queries 2000 to", 10),
        ],
    ));
    let batches = partition(records(2500), 1000).unwrap();
    assert_eq!(batch_ranges(&batches), vec![(0, 999), (1000, 1999), (2000, 2499)]);

    let messages = dispatcher(agent, Termination::new("exit", 15).unwrap(), "exit")
        .dispatch_all(batches, 2500)
        .await
        .unwrap();

    // task + four assistants + proxy, per batch
    assert_eq!(messages.len(), 18);
    let ranges: Vec<(usize, usize)> = messages
        .iter()
        .map(|m| (m.batch_start, m.batch_end))
        .collect();
    let mut expected = Vec::new();
    for range in [(0, 999), (1000, 1999), (2000, 2499)] {
        expected.extend(std::iter::repeat_n(range, 6));
    }
    assert_eq!(ranges, expected);

    let tasks: Vec<_> = messages.iter().filter(|m| m.source == "user").collect();
    assert_eq!(tasks.len(), 3);
    for task in tasks {
        assert!(task.content.contains("(2500 in total)"));
        assert!(task.prompt_tokens.is_none());
    }
    assert!(messages[0].content.contains("queries 0 to 999"));
    assert!(messages[12].content.contains("queries 2000 to 2499"));
}

#[tokio::test(start_paused = true)]
async fn first_failure_cancels_in_flight_batches() {
    let agent = Arc::new(ScriptedAgent::new(
        "handled",
        vec![
            Rule::fail("queries 4 to", 5),
            Rule::delay("queries 0 to", 50),
            Rule::delay("queries 2 to", 50),
        ],
    ));
    let batches = partition(records(6), 2).unwrap();

    let err = dispatcher(agent.clone(), Termination::new("exit", 15).unwrap(), "exit")
        .dispatch_all(batches, 6)
        .await
        .unwrap_err();

    assert!(err.is_batch_execution());
    assert_eq!(err.batch_range(), Some((4, 5)));
    assert!(err.to_string().contains("upstream unavailable"));
    // Each slow batch was stopped during its first agent call.
    assert_eq!(agent.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn every_batch_stops_within_max_turns() {
    let agent = Arc::new(ScriptedAgent::new("still working on it", Vec::new()));
    let batches = partition(records(5), 2).unwrap();

    let messages = dispatcher(agent, Termination::new("exit", 7).unwrap(), "any update?")
        .dispatch_all(batches, 5)
        .await
        .unwrap();

    // three batches, each task message plus seven turns
    assert_eq!(messages.len(), 3 * 8);
    let proxy_turns = messages
        .iter()
        .filter(|m| m.source == "customer_proxy")
        .count();
    assert_eq!(proxy_turns, 3);
    assert!(
        messages
            .iter()
            .filter(|m| m.source == "customer_proxy")
            .all(|m| m.prompt_tokens.is_none() && m.completion_tokens.is_none())
    );
}

#[tokio::test]
async fn quoting_the_phrase_ends_the_batch_early() {
    let agent = Arc::new(ScriptedAgent::new(
        "Customer wrote: \"how do I exit the app?\"",
        Vec::new(),
    ));
    let batches = partition(records(1), 10).unwrap();

    let messages = dispatcher(agent, Termination::new("exit", 15).unwrap(), "exit")
        .dispatch_all(batches, 1)
        .await
        .unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].source, "front_desk");
}

#[tokio::test]
async fn customer_query_containing_phrase_does_not_end_run() {
    let records = vec![Record::new(vec![
        ("query_id".to_string(), "0".to_string()),
        ("question".to_string(), "How do I exit my contract early?".to_string()),
    ])];
    let agent = Arc::new(ScriptedAgent::new("Forwarded to order handling", Vec::new()));
    let batches = partition(records, 10).unwrap();

    let messages = dispatcher(agent.clone(), Termination::new("exit", 15).unwrap(), "exit")
        .dispatch_all(batches, 1)
        .await
        .unwrap();

    assert!(messages[0].content.contains("exit my contract"));
    // every assistant still spoke; only the proxy's reply ended the batch
    assert_eq!(agent.calls(), 4);
    assert_eq!(messages.len(), 6);
    assert_eq!(messages[5].source, "customer_proxy");
    assert_eq!(messages[5].content, "exit");
}

fn config_in(dir: &TempDir, window_size: usize) -> TriageConfig {
    let mut config = TriageConfig::default();
    config.dispatch.window_size = window_size;
    config.io.input_path = dir.path().join("customer_queries.csv");
    config.io.output_path = dir.path().join("customer_service_log.csv");
    config
}

#[tokio::test]
async fn run_writes_log_with_usage_and_non_ascii_text() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, 2);
    fs::write(
        &config.io.input_path,
        "query_id,customer,question\n1,王小明,我的訂單還沒到\n2,Ana,¿Dónde está mi pedido?\n3,Lee,Wi-Fi 斷線\n",
    )
    .unwrap();

    let agent = Arc::new(ScriptedAgent::new("已為您轉交訂單專員 ✅", Vec::new()));
    let summary = run_with(&config, agent, Arc::new(AutoReply::new("exit")))
        .await
        .unwrap();

    assert_eq!(summary.records, 3);
    assert_eq!(summary.batches, 2);
    assert_eq!(summary.messages, 12);

    let log = read_message_log(&config.io.output_path).unwrap();
    assert_eq!(log.len(), 12);
    assert_eq!((log[0].batch_start, log[0].batch_end), (0, 1));
    assert_eq!((log[6].batch_start, log[6].batch_end), (2, 2));
    assert!(log[0].content.contains("王小明"));
    assert_eq!(log[1].content, "已為您轉交訂單專員 ✅");
    assert_eq!(log[1].prompt_tokens, Some(120));
    assert_eq!(log[1].completion_tokens, Some(30));
    assert_eq!(log[5].source, "customer_proxy");
    assert_eq!(log[5].prompt_tokens, None);
}

#[tokio::test]
async fn failed_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, 1);
    fs::write(&config.io.input_path, "query_id\n1\n2\n").unwrap();

    let agent = Arc::new(ScriptedAgent::new(
        "handled",
        vec![Rule::fail("queries 1 to", 0)],
    ));
    let err = run_with(&config, agent, Arc::new(AutoReply::new("exit")))
        .await
        .unwrap_err();

    assert_eq!(err.batch_range(), Some((1, 1)));
    assert!(!config.io.output_path.exists());
}

#[tokio::test]
async fn invalid_configuration_fails_before_reading_input() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, 0);

    let err = run_with(
        &config,
        Arc::new(ScriptedAgent::new("unused", Vec::new())),
        Arc::new(AutoReply::new("exit")),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, TriageError::Configuration(_)));
    assert!(!config.io.output_path.exists());
}

#[tokio::test]
async fn missing_input_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, 10);

    let err = run_with(
        &config,
        Arc::new(ScriptedAgent::new("unused", Vec::new())),
        Arc::new(AutoReply::new("exit")),
    )
    .await
    .unwrap_err();

    assert!(err.is_config());
}
