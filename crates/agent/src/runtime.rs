//! Chat orchestration.
//!
//! One `ChatSession` owns one conversation. A turn moves through two states:
//! idle (no completion in flight) and awaiting-tool (the model asked for a
//! tool invocation and the bridge is working). The loop below makes that
//! state machine explicit and bounds it: a model that never converges on a
//! final answer must not hang the turn, so exceeding the cap is a hard,
//! reported failure.

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use carbot_core::config::AgentConfig;

use crate::conversation::{ConversationLog, Role};
use crate::llm::{ChatMessage, CompletionClient, CompletionOutcome, LlmError};
use crate::tools::{BridgeError, ToolDispatcher};

/// What the end user sees when a turn fails for an infrastructure reason.
/// Details go to the log, never into the conversation.
pub const GENERIC_APOLOGY: &str =
    "I'm sorry, something went wrong on my side. Please try that again in a moment.";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("tool-call loop exceeded {limit} iterations without a final reply")]
    ToolLoopExceeded { limit: u32 },
}

pub struct ChatSession {
    completion: Arc<dyn CompletionClient>,
    tools: Arc<dyn ToolDispatcher>,
    log: ConversationLog,
    history_window: usize,
    max_tool_iterations: u32,
}

impl ChatSession {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        tools: Arc<dyn ToolDispatcher>,
        config: &AgentConfig,
    ) -> Self {
        Self {
            completion,
            tools,
            log: ConversationLog::new(),
            history_window: config.history_window,
            max_tool_iterations: config.max_tool_iterations,
        }
    }

    pub fn history(&self) -> &ConversationLog {
        &self.log
    }

    /// Runs one conversational turn. The `&mut self` receiver is the
    /// serialization discipline: a session processes turns strictly one at a
    /// time.
    pub async fn chat(&mut self, message: &str) -> Result<String, AgentError> {
        let correlation_id = Uuid::new_v4();

        self.log.append(Role::User, message);
        let prompt = self.log.render_window(self.history_window, message);

        let mut messages = vec![
            ChatMessage::System(system_instructions(Local::now().date_naive())),
            ChatMessage::User(prompt),
        ];
        let declarations = self.tools.declarations().to_vec();

        for iteration in 0..self.max_tool_iterations {
            let outcome = self.completion.complete(&messages, &declarations).await?;

            match outcome {
                CompletionOutcome::Final(reply) => {
                    info!(
                        event_name = "agent.turn.completed",
                        correlation_id = %correlation_id,
                        iterations = iteration + 1,
                        "turn produced a final reply"
                    );
                    self.log.append(Role::Assistant, reply.clone());
                    return Ok(reply);
                }
                CompletionOutcome::ToolCalls(calls) => {
                    messages.push(ChatMessage::Assistant {
                        content: None,
                        tool_calls: calls.clone(),
                    });

                    for call in calls {
                        info!(
                            event_name = "agent.tool.dispatch",
                            correlation_id = %correlation_id,
                            tool = %call.name,
                            "model requested a tool invocation"
                        );
                        let result = self.tools.dispatch(&call.name, &call.arguments).await?;
                        messages.push(ChatMessage::ToolResult {
                            call_id: call.id,
                            content: result.to_string(),
                        });
                    }
                }
            }
        }

        warn!(
            event_name = "agent.turn.loop_exceeded",
            correlation_id = %correlation_id,
            limit = self.max_tool_iterations,
            "tool-call loop never converged on a final reply"
        );
        Err(AgentError::ToolLoopExceeded { limit: self.max_tool_iterations })
    }
}

/// CarBot persona and ground rules. The date is interpolated so
/// "today"/"tomorrow" requests can be grounded without the model guessing.
fn system_instructions(today: NaiveDate) -> String {
    format!(
        "You are CarBot, a helpful and professional car service booking assistant at an \
         automotive service center. You are friendly, efficient, and always prioritize \
         customer convenience.\n\
         \n\
         Today is {today} ({weekday}). Shop hours are 9 AM - 6 PM with slots at 9 AM, \
         11 AM, 1 PM, 3 PM and 5 PM. Some slots may already be booked.\n\
         \n\
         Rules:\n\
         - NEVER guess availability. Always check the system first.\n\
         - NEVER mention tools, APIs, or technical details of how you work; if asked, \
           politely redirect to booking services.\n\
         - Review the previous conversation before responding and continue from where it \
           left off. Do not restart or repeat questions.\n\
         \n\
         Booking flow: ask for the preferred date, check availability, show the open time \
         slots (suggest another date if none), let the customer pick a time, then collect \
         name, phone number, car model and service type progressively, acknowledging \
         whatever was already provided. Show the collected details and ask for \
         confirmation before booking. After booking, share the confirmation with the \
         ticket ID and all appointment details.\n\
         \n\
         Keep responses concise, friendly, and helpful.",
        today = today,
        weekday = today.weekday(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use carbot_core::config::AgentConfig;

    use super::{AgentError, ChatSession};
    use crate::conversation::Role;
    use crate::llm::{
        ChatMessage, CompletionClient, CompletionOutcome, LlmError, ToolCallRequest,
    };
    use crate::tools::{declarations, BridgeError, ToolDeclaration, ToolDispatcher};

    struct ScriptedCompletion {
        script: Mutex<Vec<CompletionOutcome>>,
    }

    impl ScriptedCompletion {
        fn new(outcomes: Vec<CompletionOutcome>) -> Arc<Self> {
            Arc::new(Self { script: Mutex::new(outcomes) })
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedCompletion {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _tools: &[ToolDeclaration],
        ) -> Result<CompletionOutcome, LlmError> {
            let mut script = self.script.lock().expect("script mutex poisoned");
            if script.is_empty() {
                // An exhausted script keeps requesting tools, which is how
                // the loop-cap test drives the session past its limit.
                return Ok(CompletionOutcome::ToolCalls(vec![ToolCallRequest {
                    id: "call_loop".to_string(),
                    name: "get_available_slots".to_string(),
                    arguments: json!({}),
                }]));
            }
            Ok(script.remove(0))
        }
    }

    struct StubDispatcher {
        declarations: Vec<ToolDeclaration>,
        dispatched: Mutex<Vec<String>>,
        result: Value,
    }

    impl StubDispatcher {
        fn new(result: Value) -> Arc<Self> {
            Arc::new(Self {
                declarations: declarations(),
                dispatched: Mutex::new(Vec::new()),
                result,
            })
        }
    }

    #[async_trait]
    impl ToolDispatcher for StubDispatcher {
        fn declarations(&self) -> &[ToolDeclaration] {
            &self.declarations
        }

        async fn dispatch(&self, name: &str, _arguments: &Value) -> Result<Value, BridgeError> {
            if name == "broken_tool" {
                return Err(BridgeError::UnknownTool { name: name.to_string() });
            }
            self.dispatched.lock().expect("dispatch mutex poisoned").push(name.to_string());
            Ok(self.result.clone())
        }
    }

    fn config() -> AgentConfig {
        AgentConfig { history_window: 10, max_tool_iterations: 3 }
    }

    #[tokio::test]
    async fn direct_reply_completes_without_touching_tools() {
        let completion = ScriptedCompletion::new(vec![CompletionOutcome::Final(
            "Hello! Which date works for you?".to_string(),
        )]);
        let tools = StubDispatcher::new(json!({}));
        let mut session = ChatSession::new(completion, tools.clone(), &config());

        let reply = session.chat("hi").await.expect("turn succeeds");
        assert_eq!(reply, "Hello! Which date works for you?");
        assert!(tools.dispatched.lock().expect("lock").is_empty());

        let turns = session.history().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn tool_round_trip_feeds_result_back_and_finishes() {
        let completion = ScriptedCompletion::new(vec![
            CompletionOutcome::ToolCalls(vec![ToolCallRequest {
                id: "call_1".to_string(),
                name: "get_available_slots".to_string(),
                arguments: json!({ "date": "2025-12-31" }),
            }]),
            CompletionOutcome::Final("We have 11:00 AM and 03:00 PM open.".to_string()),
        ]);
        let tools = StubDispatcher::new(json!({
            "success": true,
            "total_slots": 2,
            "slots": [
                { "date": "2025-12-31", "time": "11:00 AM", "available": true },
                { "date": "2025-12-31", "time": "03:00 PM", "available": true }
            ]
        }));
        let mut session = ChatSession::new(completion, tools.clone(), &config());

        let reply = session.chat("what's open on the 31st?").await.expect("turn succeeds");
        assert_eq!(reply, "We have 11:00 AM and 03:00 PM open.");
        assert_eq!(
            *tools.dispatched.lock().expect("lock"),
            vec!["get_available_slots".to_string()]
        );
    }

    #[tokio::test]
    async fn runaway_tool_loop_hits_the_cap() {
        let completion = ScriptedCompletion::new(Vec::new());
        let tools = StubDispatcher::new(json!({ "success": true, "total_slots": 0, "slots": [] }));
        let mut session = ChatSession::new(completion, tools, &config());

        let error = session.chat("book me something").await.expect_err("loop must be bounded");
        assert!(matches!(error, AgentError::ToolLoopExceeded { limit: 3 }));
    }

    #[tokio::test]
    async fn protocol_error_from_the_bridge_fails_the_turn() {
        let completion = ScriptedCompletion::new(vec![CompletionOutcome::ToolCalls(vec![
            ToolCallRequest {
                id: "call_1".to_string(),
                name: "broken_tool".to_string(),
                arguments: json!({}),
            },
        ])]);
        let tools = StubDispatcher::new(json!({}));
        let mut session = ChatSession::new(completion, tools, &config());

        let error = session.chat("hi").await.expect_err("unknown tool is fatal");
        assert!(matches!(error, AgentError::Bridge(BridgeError::UnknownTool { .. })));
    }
}
