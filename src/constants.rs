//! Centralized constants for cocobot.
//!
//! Default strings, fixed dialogue texts and endpoint URLs live here so they
//! can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "cocobot";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "cocobot.toml";

// --- Providers and models ---

/// Default provider when none is configured.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Default LLM model identifier (Gemini).
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default LLM model identifier for Anthropic.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-6";

/// Default LLM model identifier for OpenAI.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1";

/// Default LLM model identifier for OpenRouter.
pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemini-2.5-flash";

/// Default base URL for local Ollama server.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default LLM model identifier for Ollama.
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3";

/// Provider-agnostic credential variable, checked after the provider's own.
pub const GENERIC_API_KEY_VAR: &str = "API_KEY";

/// Output token cap for providers that require one (Anthropic).
pub const MAX_TOKENS: u64 = 4096;

// --- Dialogue ---

/// Utterance sent on startup to prime the scripted greeting.
pub const OPENING_UTTERANCE: &str = "Hola";

/// Name of the single tool the model may call.
pub const SAVE_ORDER_TOOL: &str = "guardarPedido";

/// System instruction describing the step-by-step order script.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"Eres un asistente de pedidos para 'Puro Coco'. Tu objetivo es guiar al usuario a través del proceso de pedido paso a paso de una manera conversacional y natural. Sé conciso, claro y amigable. Sigue estrictamente esta secuencia y no te saltes ningún paso:
1. Comienza la conversación con el siguiente saludo y pregunta: "Hola soy tu asistente de pedidos de Puro Coco.

¿Podría indicarme su nombre o empresa?".
2. Una vez que te den un nombre, pide su dirección de entrega completa.
3. Inmediatamente después de que el usuario proporcione la dirección, sin hacer ningún comentario, pasa a la siguiente pregunta: "¿Me podría indicar la cantidad y el producto que desea pedir?". El único producto disponible es 'Agua de Coco'.
4. Cuando tengas toda la información (nombre, dirección, producto y cantidad), resume el pedido completo en una lista clara y pide confirmación al usuario (por ejemplo, '¿Es todo correcto?').
5. Si el usuario confirma, NO respondas directamente al usuario. En su lugar, llama a la herramienta 'guardarPedido' con todos los detalles recopilados (nombre, lugar, cantidad, producto).
6. Una vez que la herramienta 'guardarPedido' se ejecute, el sistema te lo notificará. SOLO ENTONCES, responde al usuario agradeciéndole por el pedido y diciéndole que ha sido procesado. Después de confirmar, reinicia la conversación para un nuevo pedido comenzando desde el paso 1.
7. Si el usuario no confirma o quiere cambiar algo, pregúntale qué le gustaría modificar y ayúdale a corregirlo. Luego, vuelve a presentar el resumen para su confirmación.
No respondas con JSON. Mantén la conversación en español."#;

/// Bot message shown once when the session cannot be initialized.
pub const INIT_FAILURE_TEXT: &str = "Error: No se pudo inicializar el chatbot. Asegúrate de que la clave de API esté configurada correctamente.";

/// Bot message shown when the opening greeting cannot be fetched.
pub const CONNECT_APOLOGY_TEXT: &str =
    "Lo siento, estoy teniendo problemas para conectarme. Por favor, inténtalo de nuevo más tarde.";

/// Bot message shown when a user turn fails.
pub const TURN_APOLOGY_TEXT: &str = "Oops, algo salió mal. Por favor, intenta de nuevo.";

// --- Order persistence ---

/// Default Apps Script deployment that appends orders to the spreadsheet.
pub const DEFAULT_ORDER_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycbwJh4O9vrX4FjiBMo6SjQyeNvPRWfXd9_SHqjgfjAA2XMJJHITDHLrGepQdQTbWD_YiUA/exec";

/// Tool result text reported to the model after a successful save.
pub const ORDER_SAVED_TEXT: &str = "Pedido guardado exitosamente.";

/// Tool result text reported to the model after a failed save.
pub const ORDER_SAVE_FAILED_TEXT: &str = "Hubo un error al guardar el pedido.";

// --- Terminal ---

/// Dimmed indicator printed while a turn is in flight.
pub const TYPING_INDICATOR: &str = "escribiendo...";

/// Default tracing directive when neither `RUST_LOG` nor `--log-level` is set.
pub const DEFAULT_LOG_DIRECTIVE: &str = "cocobot=warn";
