use anyhow::Result;

mod client;

pub use client::GeminiClient;

/// Binary document content sent alongside the prompt.
pub struct Attachment<'a> {
    pub mime_type: &'a str,
    pub data: &'a [u8],
}

/// The extraction capability: generate free-form text from a prompt plus
/// optional binary content, addressed by a model identifier.
///
/// The returned text may or may not contain valid structured data; isolating
/// the payload is the extractor's job.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        attachment: Option<&Attachment<'_>>,
    ) -> Result<String>;
}
