//! The agent orchestrator (spec §4.5): drives a single chat turn through
//! history load, model call, tool loop, and persistence, with per-turn
//! timeouts and cancellation.

use std::time::Duration;

use rag_core::search::SearchResult;
use rag_core::session::{Message, Role};
use rag_store::VectorStoreGateway;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use crate::error::AgentError;
use crate::llm::{ChatCompletion, ChatMessage, ChatRequest, LlmClient, chunk_into_tokens};
use crate::state::{Citation, TurnState};
use crate::stream::StreamEvent;
use crate::tool::{ToolContext, ToolRegistry};

/// Per-turn tool-call budget (spec §4.5).
pub const MAX_TOOL_CALLS: u32 = 8;
/// Wall-clock ceiling for an entire turn (spec §4.5).
pub const TURN_TIMEOUT: Duration = Duration::from_secs(90);
/// Ceiling for a single tool invocation (spec §4.5).
pub const TOOL_TIMEOUT: Duration = Duration::from_secs(10);
/// Ceiling for a single LLM call (spec §4.5).
pub const LLM_TIMEOUT: Duration = Duration::from_secs(60);

/// The fully materialized outcome of a completed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub content: String,
    pub citations: Vec<Citation>,
}

/// Drives chat turns against an LLM and a tool registry, persisting
/// history through the store gateway (spec §4.5).
pub struct AgentOrchestrator {
    llm: std::sync::Arc<dyn LlmClient>,
    tools: ToolRegistry,
    store: VectorStoreGateway,
    model: String,
    system_prompt: String,
}

impl AgentOrchestrator {
    #[must_use]
    pub const fn new(
        llm: std::sync::Arc<dyn LlmClient>,
        tools: ToolRegistry,
        store: VectorStoreGateway,
        model: String,
        system_prompt: String,
    ) -> Self {
        Self {
            llm,
            tools,
            store,
            model,
            system_prompt,
        }
    }

    /// A cheap reachability probe for the configured LLM provider, used
    /// by the HTTP surface's composite `GET /health` (spec §4.6).
    pub async fn llm_health(&self) -> bool {
        self.llm.health().await
    }

    fn to_chat_messages(history: &[Message]) -> Vec<ChatMessage> {
        history
            .iter()
            .map(|m| ChatMessage {
                role: role_str(m.role).to_string(),
                content: Some(m.content.clone()),
                tool_calls: None,
                tool_call_id: None,
            })
            .collect()
    }

    fn citations_from_results(results: &[SearchResult]) -> Vec<Citation> {
        results
            .iter()
            .map(|r| Citation {
                document_id: r.document_id.clone(),
                document_title: r.document_title.clone(),
                chunk_id: r.chunk_id.clone(),
                score: r.score,
            })
            .collect()
    }

    /// Run a full turn: `Init -> LoadHistory -> CallModel -> (ToolLoop |
    /// Emit) -> Persist -> End` (spec §4.5).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Timeout`] if the turn exceeds
    /// [`TURN_TIMEOUT`], [`AgentError::Cancelled`] if `cancellation` fires
    /// first, or any store/LLM/tool error encountered along the way.
    #[instrument(skip(self, cancellation), fields(session_id))]
    pub async fn run_turn(
        &self,
        session_id: &str,
        user_message: &str,
        cancellation: CancellationToken,
    ) -> Result<TurnOutcome, AgentError> {
        tokio::select! {
            biased;
            () = cancellation.cancelled() => Err(AgentError::Cancelled),
            result = timeout(TURN_TIMEOUT, self.drive(session_id, user_message, &cancellation)) => {
                result.map_err(|_| AgentError::Timeout("turn exceeded 90s ceiling".into()))?
            }
        }
    }

    /// Run a full turn, emitting `token | citation | end | error` events to
    /// `events` as they become available instead of returning the
    /// completed [`TurnOutcome`] in one shot (spec §4.5 `Emit`, streaming
    /// case).
    ///
    /// If `events` is closed (the client disconnected) the turn is
    /// abandoned: no assistant message is persisted and any in-flight
    /// model/tool call's future is dropped, releasing its resources
    /// promptly (spec §4.5 Cancellation, spec §8 scenario 5).
    #[instrument(skip(self, cancellation, events), fields(session_id))]
    pub async fn run_turn_streaming(
        &self,
        session_id: &str,
        user_message: &str,
        cancellation: CancellationToken,
        events: tokio::sync::mpsc::Sender<StreamEvent>,
    ) {
        let result = tokio::select! {
            biased;
            () = cancellation.cancelled() => Err(AgentError::Cancelled),
            result = timeout(TURN_TIMEOUT, self.drive_streaming(session_id, user_message, &cancellation, &events)) => {
                result.unwrap_or_else(|_| Err(AgentError::Timeout("turn exceeded 90s ceiling".into())))
            }
        };

        if let Err(e) = result
            && !matches!(e, AgentError::Cancelled)
        {
            warn!(error = %e, "streaming turn ended in error");
            let _ = events.send(StreamEvent::Error(e.to_string())).await;
        }
    }

    /// Streaming counterpart of [`Self::drive`]: same state machine, but
    /// tool-result citations and response tokens are pushed to `events`
    /// as soon as each is available, and a closed `events` channel is
    /// treated as a cooperative cancellation signal.
    async fn drive_streaming(
        &self,
        session_id: &str,
        user_message: &str,
        cancellation: &CancellationToken,
        events: &tokio::sync::mpsc::Sender<StreamEvent>,
    ) -> Result<(), AgentError> {
        let mut state = TurnState::Init;
        let mut citations: Vec<Citation> = Vec::new();
        let mut total_calls_made: u32 = 0;

        loop {
            if events.is_closed() {
                return Err(AgentError::Cancelled);
            }

            state = match state {
                TurnState::Init => TurnState::LoadHistory,

                TurnState::LoadHistory => {
                    let mut history = self.store.recent_messages(session_id, 50).await?;
                    let stored = self
                        .store
                        .append_message(
                            session_id,
                            Role::User,
                            user_message.to_string(),
                            serde_json::json!({}),
                        )
                        .await?;
                    history.push(stored);
                    TurnState::CallModel { history }
                }

                TurnState::CallModel { history } => {
                    let request = ChatRequest {
                        model: self.model.clone(),
                        system: self.system_prompt.clone(),
                        messages: Self::to_chat_messages(&history),
                        tools: self.tools.schemas(),
                    };

                    let completion = timeout(LLM_TIMEOUT, self.llm.complete(request))
                        .await
                        .map_err(|_| AgentError::Timeout("LLM call exceeded 60s ceiling".into()))??;

                    match completion {
                        ChatCompletion::Content(content) => TurnState::Emit {
                            history,
                            content,
                            citations: citations.clone(),
                        },
                        ChatCompletion::ToolCalls(pending) => {
                            TurnState::ToolLoop { history, pending }
                        }
                    }
                }

                TurnState::ToolLoop { mut history, pending } => {
                    let budget_after =
                        total_calls_made + u32::try_from(pending.len()).unwrap_or(u32::MAX);
                    if budget_after > MAX_TOOL_CALLS {
                        return Err(AgentError::ToolBudgetExceeded {
                            budget: MAX_TOOL_CALLS,
                        });
                    }

                    let ctx = ToolContext {
                        cancellation: cancellation.clone(),
                    };

                    for call in pending {
                        total_calls_made += 1;
                        let outcome = timeout(
                            TOOL_TIMEOUT,
                            self.tools.dispatch(&call.name, call.arguments.clone(), &ctx),
                        )
                        .await
                        .map_err(|_| {
                            AgentError::Timeout(format!("tool {} exceeded 10s ceiling", call.name))
                        })?;

                        let result_value = match outcome {
                            Ok(value) => {
                                if let Some(results) = value.get("results")
                                    && let Ok(parsed) =
                                        serde_json::from_value::<Vec<SearchResult>>(results.clone())
                                {
                                    let new_citations = Self::citations_from_results(&parsed);
                                    for citation in &new_citations {
                                        if events
                                            .send(StreamEvent::Citation(citation.clone()))
                                            .await
                                            .is_err()
                                        {
                                            return Err(AgentError::Cancelled);
                                        }
                                    }
                                    citations.extend(new_citations);
                                }
                                value
                            }
                            Err(e) => {
                                warn!(tool = %call.name, error = %e, "tool invocation failed");
                                serde_json::json!({ "error": e.to_string() })
                            }
                        };

                        history.push(Message {
                            id: rag_core::ids::new_id("msg"),
                            session_id: session_id.to_string(),
                            role: Role::Tool,
                            content: result_value.to_string(),
                            metadata: std::collections::HashMap::new(),
                            created_at: chrono::Utc::now(),
                        });
                    }

                    TurnState::CallModel { history }
                }

                TurnState::Emit { content, citations, .. } => {
                    for token in chunk_into_tokens(&content) {
                        if events.send(StreamEvent::Token(token)).await.is_err() {
                            return Err(AgentError::Cancelled);
                        }
                    }
                    TurnState::Persist { content, citations }
                }

                TurnState::Persist { content, citations } => {
                    if events.is_closed() {
                        return Err(AgentError::Cancelled);
                    }
                    self.store
                        .append_message(
                            session_id,
                            Role::Assistant,
                            content.clone(),
                            serde_json::json!({ "citations": citations }),
                        )
                        .await?;
                    TurnState::End { content, citations }
                }

                TurnState::End { content, citations } => {
                    let _ = events
                        .send(StreamEvent::End { content, citations })
                        .await;
                    return Ok(());
                }
            };
        }
    }

    /// Step the turn state machine to completion.
    async fn drive(
        &self,
        session_id: &str,
        user_message: &str,
        cancellation: &CancellationToken,
    ) -> Result<TurnOutcome, AgentError> {
        let mut state = TurnState::Init;
        let mut citations: Vec<Citation> = Vec::new();
        let mut total_calls_made: u32 = 0;

        loop {
            state = match state {
                TurnState::Init => TurnState::LoadHistory,

                TurnState::LoadHistory => {
                    let mut history = self.store.recent_messages(session_id, 50).await?;
                    let stored = self
                        .store
                        .append_message(
                            session_id,
                            Role::User,
                            user_message.to_string(),
                            serde_json::json!({}),
                        )
                        .await?;
                    history.push(stored);
                    TurnState::CallModel { history }
                }

                TurnState::CallModel { history } => {
                    let request = ChatRequest {
                        model: self.model.clone(),
                        system: self.system_prompt.clone(),
                        messages: Self::to_chat_messages(&history),
                        tools: self.tools.schemas(),
                    };

                    let completion = timeout(LLM_TIMEOUT, self.llm.complete(request))
                        .await
                        .map_err(|_| AgentError::Timeout("LLM call exceeded 60s ceiling".into()))??;

                    match completion {
                        ChatCompletion::Content(content) => TurnState::Emit {
                            history,
                            content,
                            citations: citations.clone(),
                        },
                        ChatCompletion::ToolCalls(pending) => {
                            TurnState::ToolLoop { history, pending }
                        }
                    }
                }

                TurnState::ToolLoop {
                    mut history,
                    pending,
                } => {
                    let budget_after =
                        total_calls_made + u32::try_from(pending.len()).unwrap_or(u32::MAX);
                    if budget_after > MAX_TOOL_CALLS {
                        return Err(AgentError::ToolBudgetExceeded {
                            budget: MAX_TOOL_CALLS,
                        });
                    }

                    let ctx = ToolContext {
                        cancellation: cancellation.clone(),
                    };

                    for call in pending {
                        total_calls_made += 1;
                        let outcome = timeout(
                            TOOL_TIMEOUT,
                            self.tools.dispatch(&call.name, call.arguments.clone(), &ctx),
                        )
                        .await
                        .map_err(|_| {
                            AgentError::Timeout(format!("tool {} exceeded 10s ceiling", call.name))
                        })?;

                        let result_value = match outcome {
                            Ok(value) => {
                                if let Some(results) = value.get("results")
                                    && let Ok(parsed) =
                                        serde_json::from_value::<Vec<SearchResult>>(results.clone())
                                {
                                    citations.extend(Self::citations_from_results(&parsed));
                                }
                                value
                            }
                            Err(e) => {
                                warn!(tool = %call.name, error = %e, "tool invocation failed");
                                serde_json::json!({ "error": e.to_string() })
                            }
                        };

                        history.push(Message {
                            id: rag_core::ids::new_id("msg"),
                            session_id: session_id.to_string(),
                            role: Role::Tool,
                            content: result_value.to_string(),
                            metadata: std::collections::HashMap::new(),
                            created_at: chrono::Utc::now(),
                        });
                    }

                    TurnState::CallModel { history }
                }

                TurnState::Emit {
                    content, citations, ..
                } => TurnState::Persist { content, citations },

                TurnState::Persist { content, citations } => {
                    self.store
                        .append_message(
                            session_id,
                            Role::Assistant,
                            content.clone(),
                            serde_json::json!({ "citations": citations }),
                        )
                        .await?;
                    TurnState::End { content, citations }
                }

                TurnState::End { content, citations } => {
                    return Ok(TurnOutcome { content, citations });
                }
            };
        }
    }
}

const fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
        Role::Tool => "tool",
    }
}
