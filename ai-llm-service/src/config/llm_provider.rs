/// Represents the provider (backend) used for large language model (LLM) inference.
///
/// Only a local Ollama runtime is wired today; adding a hosted provider means
/// extending this enum and routing it in
/// [`crate::service_profiles::LlmServiceProfiles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime for on-device inference.
    Ollama,
}
