use super::*;
use crate::dialogue::{DialogueTurn, Role};
use crate::message::Sender;
use crate::orders::OrderSink;
use crate::tools::{SaveOrderTool, ToolDefinition};
use anyhow::Result;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

const GREETING: &str =
    "Hola soy tu asistente de pedidos de Puro Coco.\n\n¿Podría indicarme su nombre o empresa?";

type Requests = Arc<Mutex<Vec<Vec<DialogueTurn>>>>;

/// Model that plays back a fixed script of replies.
struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply>>>,
    requests: Requests,
    gate: Option<Arc<Notify>>,
}

#[async_trait::async_trait]
impl DialogueModel for ScriptedModel {
    async fn complete(
        &self,
        _system_instruction: &str,
        history: &[DialogueTurn],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply> {
        assert_eq!(tools.len(), 1);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.requests.lock().unwrap().push(history.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")))
    }
}

/// Sink that records payloads, optionally failing or waiting for a signal.
#[derive(Default)]
struct RecordingSink {
    fail: bool,
    gate: Option<Arc<Notify>>,
    orders: Mutex<Vec<Value>>,
}

#[async_trait::async_trait]
impl OrderSink for RecordingSink {
    async fn submit(&self, order: &Value) -> Result<()> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.orders.lock().unwrap().push(order.clone());
        if self.fail {
            anyhow::bail!("network error");
        }
        Ok(())
    }
}

struct Harness {
    session: ConversationSession,
    requests: Requests,
    sink: Arc<RecordingSink>,
}

fn harness_with(
    replies: Vec<Result<ModelReply>>,
    sink: RecordingSink,
    gate: Option<Arc<Notify>>,
) -> Harness {
    let requests: Requests = Arc::default();
    let model: Box<dyn DialogueModel> = Box::new(ScriptedModel {
        replies: Mutex::new(replies.into()),
        requests: requests.clone(),
        gate,
    });
    let sink = Arc::new(sink);
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(SaveOrderTool::new(sink.clone())));
    let session =
        ConversationSession::initialize(Ok(model), tools, SessionOptions::default());
    Harness {
        session,
        requests,
        sink,
    }
}

fn harness(replies: Vec<Result<ModelReply>>) -> Harness {
    harness_with(replies, RecordingSink::default(), None)
}

fn order_args() -> Value {
    json!({
        "nombre": "Ana",
        "lugar": "Calle 5",
        "cantidad": 3,
        "producto": "Agua de Coco"
    })
}

fn save_call(args: Value) -> ToolCall {
    ToolCall::new("call-1", "guardarPedido", args)
}

fn texts(session: &ConversationSession) -> Vec<String> {
    session
        .messages()
        .iter()
        .map(|m| m.text().to_string())
        .collect()
}

#[tokio::test]
async fn test_start_appends_scripted_greeting() {
    let h = harness(vec![Ok(ModelReply::text(GREETING))]);
    assert!(h.session.is_ready());

    h.session.start().await;

    let messages = h.session.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender(), Sender::Bot);
    assert_eq!(messages[0].text(), GREETING);

    let requests = h.requests.lock().unwrap();
    let opening = requests[0].last().unwrap();
    assert_eq!(opening.role, Role::User);
    assert_eq!(opening.content, "Hola");
    assert!(!h.session.is_busy());
}

#[tokio::test]
async fn test_start_failure_appends_one_apology_and_stays_usable() {
    let h = harness(vec![
        Err(anyhow::anyhow!("connection reset")),
        Ok(ModelReply::text(GREETING)),
    ]);

    h.session.start().await;
    assert_eq!(texts(&h.session), vec![CONNECT_APOLOGY_TEXT.to_string()]);
    assert!(!h.session.is_busy());

    let outcome = h.session.handle_user_turn("Hola").await;
    assert_eq!(outcome, TurnOutcome::Replied);
    assert_eq!(h.session.message_count(), 3);
}

#[tokio::test]
async fn test_missing_credential_shows_one_error_and_ignores_turns() {
    let tools = ToolRegistry::new();
    let session = ConversationSession::initialize(
        Err(SessionError::MissingCredential {
            provider: "gemini",
            env_var: "GEMINI_API_KEY".into(),
        }),
        tools,
        SessionOptions::default(),
    );

    assert!(!session.is_ready());
    assert!(matches!(
        session.init_error(),
        Some(SessionError::MissingCredential { .. })
    ));
    session.start().await;
    assert_eq!(
        session.handle_user_turn("Ana").await,
        TurnOutcome::Ignored
    );

    let messages = session.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].is_bot());
    assert_eq!(messages[0].text(), INIT_FAILURE_TEXT);
}

#[tokio::test]
async fn test_blank_input_is_ignored() {
    let h = harness(vec![]);
    assert_eq!(h.session.handle_user_turn("").await, TurnOutcome::Ignored);
    assert_eq!(h.session.handle_user_turn("   \n\t").await, TurnOutcome::Ignored);
    assert_eq!(h.session.message_count(), 0);
    assert!(h.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_direct_reply_appends_user_then_bot() {
    let h = harness(vec![Ok(ModelReply::text("¿Cuál es su dirección de entrega?"))]);

    let outcome = h.session.handle_user_turn("Ana").await;

    assert_eq!(outcome, TurnOutcome::Replied);
    let messages = h.session.messages();
    assert_eq!(messages[0].sender(), Sender::User);
    assert_eq!(messages[0].text(), "Ana");
    assert_eq!(messages[1].sender(), Sender::Bot);
    assert_eq!(messages[1].text(), "¿Cuál es su dirección de entrega?");
    assert!(!h.session.is_busy());
    assert_eq!(h.session.phase(), TurnPhase::Idle);
    assert!(h.sink.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_user_text_is_kept_as_typed() {
    let h = harness(vec![Ok(ModelReply::text("¿Cuál es su dirección de entrega?"))]);

    h.session.handle_user_turn("  Ana Pérez ").await;

    assert_eq!(h.session.messages()[0].text(), "  Ana Pérez ");
    let requests = h.requests.lock().unwrap();
    assert_eq!(requests[0].last().unwrap().content, "  Ana Pérez ");
}

#[tokio::test]
async fn test_full_order_persists_exactly_once() {
    let h = harness(vec![
        Ok(ModelReply::text(GREETING)),
        Ok(ModelReply::text("¿Cuál es su dirección de entrega completa?")),
        Ok(ModelReply::text(
            "¿Me podría indicar la cantidad y el producto que desea pedir?",
        )),
        Ok(ModelReply::text(
            "- Nombre: Ana\n- Dirección: Calle 5\n- Producto: Agua de Coco\n- Cantidad: 3\n¿Es todo correcto?",
        )),
        Ok(ModelReply::tool_call(save_call(order_args()))),
        Ok(ModelReply::text("¡Gracias por su pedido! Ha sido procesado.")),
    ]);

    h.session.start().await;
    for input in ["Ana", "Calle 5", "3 Agua de Coco", "Sí"] {
        assert_eq!(h.session.handle_user_turn(input).await, TurnOutcome::Replied);
    }

    assert_eq!(*h.sink.orders.lock().unwrap(), vec![order_args()]);
    assert_eq!(h.session.message_count(), 9);
    assert_eq!(
        h.session.messages().last().unwrap().text(),
        "¡Gracias por su pedido! Ha sido procesado."
    );

    let requests = h.requests.lock().unwrap();
    assert_eq!(requests.len(), 6);
    let relayed = requests[5].last().unwrap();
    assert_eq!(relayed.role, Role::Tool);
    assert_eq!(relayed.tool_call_id.as_deref(), Some("call-1"));
    let payload: Value = serde_json::from_str(&relayed.content).unwrap();
    assert_eq!(payload, json!({"result": "Pedido guardado exitosamente."}));
}

#[tokio::test]
async fn test_persistence_failure_still_replies() {
    let h = harness_with(
        vec![
            Ok(ModelReply::tool_call(save_call(order_args()))),
            Ok(ModelReply::text("Lo siento, no pude guardar su pedido.")),
        ],
        RecordingSink {
            fail: true,
            ..Default::default()
        },
        None,
    );

    let outcome = h.session.handle_user_turn("Sí").await;

    assert_eq!(outcome, TurnOutcome::Replied);
    assert_eq!(
        texts(&h.session),
        vec!["Sí", "Lo siento, no pude guardar su pedido."]
    );
    let requests = h.requests.lock().unwrap();
    let payload: Value = serde_json::from_str(&requests[1].last().unwrap().content).unwrap();
    assert!(payload.get("error").is_some());
}

#[tokio::test]
async fn test_transport_failure_apologizes_and_recovers() {
    let h = harness(vec![
        Err(anyhow::anyhow!("503 Service Unavailable")),
        Ok(ModelReply::text("¿Cuál es su dirección?")),
    ]);

    assert_eq!(h.session.handle_user_turn("Ana").await, TurnOutcome::Apologized);
    assert_eq!(texts(&h.session), vec!["Ana", TURN_APOLOGY_TEXT]);
    assert!(!h.session.is_busy());

    assert_eq!(h.session.handle_user_turn("Ana").await, TurnOutcome::Replied);
    // The failed attempt left nothing behind in the model context.
    let requests = h.requests.lock().unwrap();
    assert_eq!(requests[1].len(), 1);
}

#[tokio::test]
async fn test_relay_failure_rolls_back_the_tool_call() {
    let h = harness(vec![
        Ok(ModelReply::tool_call(save_call(order_args()))),
        Err(anyhow::anyhow!("timeout")),
        Ok(ModelReply::text("¿Desea algo más?")),
    ]);

    assert_eq!(h.session.handle_user_turn("Sí").await, TurnOutcome::Apologized);
    assert_eq!(h.sink.orders.lock().unwrap().len(), 1);

    assert_eq!(h.session.handle_user_turn("Hola").await, TurnOutcome::Replied);
    let requests = h.requests.lock().unwrap();
    let last = requests.last().unwrap();
    assert_eq!(last.len(), 1);
    assert!(last.iter().all(|t| t.tool_calls.is_empty()));
}

#[tokio::test]
async fn test_second_turn_is_ignored_while_busy() {
    let gate = Arc::new(Notify::new());
    let h = harness_with(
        vec![Ok(ModelReply::text("¿Cuál es su dirección?"))],
        RecordingSink::default(),
        Some(gate.clone()),
    );
    assert!(!h.session.is_busy());

    let (first, second) = tokio::join!(h.session.handle_user_turn("Ana"), async {
        tokio::task::yield_now().await;
        assert!(h.session.is_busy());
        assert_eq!(h.session.phase(), TurnPhase::Sending);
        let outcome = h.session.handle_user_turn("Pedro").await;
        gate.notify_one();
        outcome
    });

    assert_eq!(first, TurnOutcome::Replied);
    assert_eq!(second, TurnOutcome::Ignored);
    assert_eq!(texts(&h.session), vec!["Ana", "¿Cuál es su dirección?"]);
    assert!(!h.session.is_busy());
}

#[tokio::test]
async fn test_phase_while_persisting() {
    let gate = Arc::new(Notify::new());
    let h = harness_with(
        vec![
            Ok(ModelReply::tool_call(save_call(order_args()))),
            Ok(ModelReply::text("¡Gracias!")),
        ],
        RecordingSink {
            gate: Some(gate.clone()),
            ..Default::default()
        },
        None,
    );

    let (outcome, _) = tokio::join!(h.session.handle_user_turn("Sí"), async {
        tokio::task::yield_now().await;
        assert!(h.session.is_busy());
        assert_eq!(h.session.phase(), TurnPhase::PersistingAndRelaying);
        gate.notify_one();
    });

    assert_eq!(outcome, TurnOutcome::Replied);
    assert_eq!(h.session.phase(), TurnPhase::Idle);
}

#[tokio::test]
async fn test_undeclared_tool_is_treated_as_direct_reply() {
    let h = harness(vec![Ok(ModelReply {
        text: "Un momento.".into(),
        tool_calls: vec![ToolCall::new("x", "borrarPedido", json!({}))],
    })]);

    assert_eq!(h.session.handle_user_turn("Sí").await, TurnOutcome::Replied);
    assert_eq!(texts(&h.session), vec!["Sí", "Un momento."]);
    assert!(h.sink.orders.lock().unwrap().is_empty());
    assert_eq!(h.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_only_first_tool_call_is_run() {
    let mut second = save_call(json!({"nombre": "Otro"}));
    second.id = "call-2".into();
    let h = harness(vec![
        Ok(ModelReply {
            text: String::new(),
            tool_calls: vec![save_call(order_args()), second],
        }),
        Ok(ModelReply::text("¡Gracias!")),
    ]);

    assert_eq!(h.session.handle_user_turn("Sí").await, TurnOutcome::Replied);
    assert_eq!(*h.sink.orders.lock().unwrap(), vec![order_args()]);
    assert_eq!(h.requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_transcript_is_append_only() {
    let h = harness(vec![
        Ok(ModelReply::text(GREETING)),
        Ok(ModelReply::text("¿Dirección?")),
        Err(anyhow::anyhow!("boom")),
    ]);

    h.session.start().await;
    let before = h.session.messages();
    h.session.handle_user_turn("Ana").await;
    h.session.handle_user_turn("Calle 5").await;
    let after = h.session.messages();

    assert_eq!(after.len(), before.len() + 4);
    for (old, new) in before.iter().zip(after.iter()) {
        assert_eq!(old.id(), new.id());
        assert_eq!(old.text(), new.text());
    }
    assert_eq!(h.session.messages_since(before.len()).len(), 4);
}
