//! The turn pipeline coordinator.
//!
//! The only component with cross-stage knowledge. One user message
//! flows through:
//!
//! ```text
//! RECEIVED ── CRISIS_CHECK ──┬─ crisis ──► OVERRIDE ─► LOG ─► DONE
//!                            │
//!                            └─ safe ───► CLASSIFY
//!                                            │
//!                              quick_tip, confident?
//!                               │ yes                │ no
//!                               ▼                    ▼
//!                          COMPOSE_FAST    PLAN ─► DISPATCH? ─► COMPOSE ─► CRITIQUE
//!                               │                    │
//!                               └───────► LOG ◄─────┘
//! ```
//!
//! `submit_turn` surfaces only [`InputError`]; every other failure
//! degrades to a stage-local fallback and the pipeline continues. The
//! crisis branch is authoritative: once the guardrail flags a message,
//! no later stage (classifier, composer, critic) sees the turn at all,
//! so no downstream failure can suppress or alter the crisis response.

use chrono::Utc;
use solace_classifier::{detect_language, IntentClassifier};
use solace_composer::Composer;
use solace_config::PipelineConfig;
use solace_critic::{Critic, CriticContext};
use solace_core::crisis::CrisisDetection;
use solace_core::error::{Error, InputError};
use solace_core::event::{DomainEvent, EventBus, Stage};
use solace_core::intent::Intent;
use solace_core::language::Language;
use solace_core::turn::{EmotionalTone, FinalResponse, ReplyChunk, TurnRecord};
use solace_guardrail::{CrisisDetector, CrisisResponder};
use solace_memory::ContextMemory;
use solace_planner::{Planner, ToolDispatcher};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct TurnPipeline {
    detector: CrisisDetector,
    responder: CrisisResponder,
    classifier: IntentClassifier,
    planner: Planner,
    dispatcher: ToolDispatcher,
    composer: Composer,
    critic: Critic,
    memory: Arc<ContextMemory>,
    events: Arc<EventBus>,
    config: PipelineConfig,
}

impl TurnPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        detector: CrisisDetector,
        responder: CrisisResponder,
        classifier: IntentClassifier,
        planner: Planner,
        dispatcher: ToolDispatcher,
        composer: Composer,
        critic: Critic,
        memory: Arc<ContextMemory>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            detector,
            responder,
            classifier,
            planner,
            dispatcher,
            composer,
            critic,
            memory,
            events: Arc::new(EventBus::default()),
            config,
        }
    }

    /// Share an event bus with observers.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    /// Process one turn. The only error that crosses this boundary is
    /// [`InputError`]; everything else degrades internally.
    pub async fn submit_turn(
        &self,
        user_id: &str,
        message: &str,
        history: &[TurnRecord],
        language_hint: Option<Language>,
    ) -> Result<FinalResponse, Error> {
        self.validate_input(user_id, message)?;
        let started = std::time::Instant::now();

        self.events.publish(DomainEvent::TurnReceived {
            user_id: user_id.to_string(),
            message_len: message.chars().count(),
            timestamp: Utc::now(),
        });

        let language = language_hint.unwrap_or_else(|| detect_language(message));

        // ── Crisis check: authoritative, runs before everything ──
        let detection = self.detector.detect(message, language).await;

        let response = if detection.is_crisis {
            self.crisis_turn(user_id, message, language, &detection).await
        } else {
            self.safe_turn(user_id, message, history, language_hint).await
        };

        self.events.publish(DomainEvent::TurnCompleted {
            user_id: user_id.to_string(),
            intent: response.intent,
            is_crisis: response.is_crisis,
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        });

        info!(
            user_id,
            intent = %response.intent,
            is_crisis = response.is_crisis,
            duration_ms = started.elapsed().as_millis() as u64,
            "Turn completed"
        );

        Ok(response)
    }

    /// Streamed variant: content chunks followed by a terminal chunk
    /// with `done = true`. Input errors arrive as an error chunk.
    pub async fn stream_turn(
        self: Arc<Self>,
        user_id: &str,
        message: &str,
        history: &[TurnRecord],
        language_hint: Option<Language>,
    ) -> tokio::sync::mpsc::Receiver<ReplyChunk> {
        let (tx, rx) = tokio::sync::mpsc::channel(16);
        let pipeline = self;
        let user_id = user_id.to_string();
        let message = message.to_string();
        let history = history.to_vec();

        tokio::spawn(async move {
            match pipeline.submit_turn(&user_id, &message, &history, language_hint).await {
                Ok(response) => {
                    // Paragraph-sized chunks keep the reply readable as it arrives.
                    for part in response.content.split_inclusive("\n\n") {
                        if tx.send(ReplyChunk::content(part)).await.is_err() {
                            return;
                        }
                    }
                    let _ = tx.send(ReplyChunk::done()).await;
                }
                Err(e) => {
                    let _ = tx.send(ReplyChunk::error(e.to_string())).await;
                }
            }
        });

        rx
    }

    fn validate_input(&self, user_id: &str, message: &str) -> Result<(), Error> {
        if user_id.trim().is_empty() {
            return Err(InputError::BlankUserId.into());
        }
        if message.trim().is_empty() {
            return Err(InputError::EmptyMessage.into());
        }
        let len = message.chars().count();
        if len > self.config.max_message_chars {
            return Err(InputError::MessageTooLong { len, max: self.config.max_message_chars }.into());
        }
        Ok(())
    }

    /// The critical path: fixed response, memory write, done. Composer
    /// and critic never see the turn.
    async fn crisis_turn(
        &self,
        user_id: &str,
        message: &str,
        language: Language,
        detection: &CrisisDetection,
    ) -> FinalResponse {
        self.events.publish(DomainEvent::CrisisDetected {
            severity: detection.severity,
            crisis_type: detection.crisis_type,
            confidence: detection.confidence,
            keyword_count: detection.keywords.len(),
            message_len: message.chars().count(),
            timestamp: Utc::now(),
        });

        let content = self.responder.respond(detection, language).render();

        self.log_turn(
            user_id,
            message,
            language,
            Intent::Crisis,
            detection.confidence,
            &content,
            vec![],
            EmotionalTone::Distressed,
            Some(detection),
        )
        .await;

        FinalResponse {
            content,
            intent: Intent::Crisis,
            is_crisis: true,
            crisis_severity: Some(detection.severity),
            confidence: detection.confidence,
            language,
            timestamp: Utc::now(),
        }
    }

    async fn safe_turn(
        &self,
        user_id: &str,
        message: &str,
        history: &[TurnRecord],
        language_hint: Option<Language>,
    ) -> FinalResponse {
        // ── Classify (cached; falls back internally) ──
        let context_turns = if history.is_empty() {
            self.memory.recent_turns(user_id, 3).await
        } else {
            history.to_vec()
        };
        let classification = self.classifier.classify(message, &context_turns).await;

        // A caller-provided language wins over the model's detection;
        // the classifier's conservative fallback lands on English.
        let language = language_hint.unwrap_or(classification.language);

        // ── Fast path: confident quick tips skip planning and critique ──
        if classification.intent == Intent::QuickTip
            && classification.confidence > self.config.fastpath_confidence
        {
            debug!(confidence = classification.confidence, "Taking fast path");
            let reply = self
                .composer
                .compose(Intent::QuickTip, None, message, language, None)
                .await;

            self.log_turn(
                user_id,
                message,
                language,
                Intent::QuickTip,
                classification.confidence,
                &reply.full_response,
                vec![],
                tone_for(Intent::QuickTip),
                None,
            )
            .await;

            return self.final_response(reply.full_response, &classification, language);
        }

        // ── Full path ──
        let context = self.memory.fetch_context(user_id).await;

        let plan = self.planner.plan(
            classification.intent,
            message,
            user_id,
            language,
            context.as_ref(),
        );

        let tool_started = std::time::Instant::now();
        let tool_result = self.dispatcher.dispatch(&plan).await;
        if let (Some(result), Some(invocation)) = (&tool_result, &plan.tool) {
            self.events.publish(DomainEvent::ToolExecuted {
                tool: invocation.name,
                success: result.success,
                duration_ms: tool_started.elapsed().as_millis() as u64,
                timestamp: Utc::now(),
            });
            if !result.success {
                self.events.publish(DomainEvent::StageFellBack {
                    stage: Stage::Dispatch,
                    reason: result.error.clone().unwrap_or_else(|| "tool failure".into()),
                    timestamp: Utc::now(),
                });
            }
        }

        let reply = self
            .composer
            .compose(
                classification.intent,
                tool_result.as_ref(),
                message,
                language,
                context.as_ref(),
            )
            .await;

        // ── Critique, with best-effort revision ──
        let critic_ctx = CriticContext {
            intent: classification.intent,
            language,
            original_message: message,
        };
        let verdict = self.critic.critique(&reply.full_response, &critic_ctx).await;
        let content = if verdict.passed {
            reply.full_response
        } else {
            self.events.publish(DomainEvent::StageFellBack {
                stage: Stage::Critique,
                reason: format!("failed checks: {:?}", verdict.failed_checks),
                timestamp: Utc::now(),
            });
            verdict.revised_response.unwrap_or(reply.full_response)
        };

        // A well-formed reply always exists, even if every stage above
        // degraded to its fallback.
        let content = if content.trim().is_empty() {
            fallback_reply(language)
        } else {
            content
        };

        let tools_used = plan.tool.as_ref().map(|t| vec![t.name]).unwrap_or_default();
        self.log_turn(
            user_id,
            message,
            language,
            classification.intent,
            classification.confidence,
            &content,
            tools_used,
            tone_for(classification.intent),
            None,
        )
        .await;

        self.final_response(content, &classification, language)
    }

    fn final_response(
        &self,
        content: String,
        classification: &solace_core::intent::IntentClassification,
        language: Language,
    ) -> FinalResponse {
        FinalResponse {
            content,
            intent: classification.intent,
            is_crisis: false,
            crisis_severity: None,
            confidence: classification.confidence,
            language,
            timestamp: Utc::now(),
        }
    }

    /// Memory write. Failures are logged and never fail the turn.
    #[allow(clippy::too_many_arguments)]
    async fn log_turn(
        &self,
        user_id: &str,
        message: &str,
        language: Language,
        intent: Intent,
        confidence: f32,
        response: &str,
        tools_used: Vec<solace_core::plan::ToolName>,
        emotional_tone: EmotionalTone,
        crisis: Option<&CrisisDetection>,
    ) {
        let record = TurnRecord {
            id: TurnRecord::new_id(),
            user_id: user_id.to_string(),
            timestamp: Utc::now(),
            user_message: message.to_string(),
            language,
            intent,
            confidence,
            tools_used,
            response: response.to_string(),
            emotional_tone,
            stress_level: None,
        };

        if let Err(e) = self.memory.write_turn(record, crisis).await {
            warn!(error = %e, "Memory write failed; turn response unaffected");
            self.events.publish(DomainEvent::StageFellBack {
                stage: Stage::MemoryWrite,
                reason: e.to_string(),
                timestamp: Utc::now(),
            });
        }
    }
}

fn tone_for(intent: Intent) -> EmotionalTone {
    match intent {
        Intent::Crisis => EmotionalTone::Distressed,
        Intent::TherapySupport => EmotionalTone::Low,
        Intent::QuickTip | Intent::PlanBuilder => EmotionalTone::Neutral,
        Intent::SmallTalk => EmotionalTone::Upbeat,
    }
}

/// The deterministic last-resort reply in the user's language.
pub fn fallback_reply(language: Language) -> String {
    match language {
        Language::Es => {
            "Gracias por escribirme. Ahora mismo no puedo darte una respuesta completa, \
             pero estoy aquí. ¿Quieres contarme un poco más sobre cómo te sientes?"
        }
        _ => {
            "Thank you for reaching out. I can't give you a full answer right now, \
             but I'm here. Would you like to tell me a bit more about how you're feeling?"
        }
    }
    .to_string()
}
