pub mod gemini;
pub mod record;

use indoc::formatdoc;

use crate::error::AppResult;

/// The extraction model seam. One stateless call per message; `page_images`
/// are PNG-encoded page rasters and may be empty.
#[allow(async_fn_in_trait)]
pub trait ExtractionModel {
    async fn generate(&self, canonical_text: &str, page_images: &[Vec<u8>]) -> AppResult<String>;
}

/// Builds the dealflow extraction prompt around the canonical message text.
/// The field names are the persistence contract; administrative fields are
/// left blank by the model and stripped before insert.
pub fn extraction_prompt(text: &str) -> String {
    formatdoc! {r#"
        You are a data extraction assistant for venture capital dealflow.
        Given the following unstructured text (which may include an email and/or a pitch deck), extract the fields below.
        Respond with only a valid JSON object with exactly these keys, using an empty string when a field is missing:
          Company
          Founder Name
          Email
          Website
          Personal Linkedin
          Blurb about Company
          Industry
          Where Are You Based
          Raise Amount
          Round -> options: Angel, PreSeed, Seed, Series A, Series B+
          Relevant Company Metrics/Traction
          Deck -> leave blank
          Deck Links -> leave blank
          Status -> leave blank
          Call Notes -> leave blank
        Do not provide explanations.

        Text:
        """{text}""""#,
        text = text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_text_and_contract() {
        let prompt = extraction_prompt("Hi, we are Acme.");
        assert!(prompt.contains("Hi, we are Acme."));
        assert!(prompt.contains("Company"));
        assert!(prompt.contains("Raise Amount"));
        assert!(prompt.contains("only a valid JSON object"));
    }
}
