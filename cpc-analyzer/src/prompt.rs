/// Persona for the system message.
pub const SYSTEM_PROMPT: &str = "You are an expert Google AdSense optimization specialist. Analyze the content and provide keyword recommendations to improve CPC (Cost Per Click) rates.";

/// The two messages sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Embed `url` and the extracted `text` into the analysis instruction.
pub fn build_prompt(url: &str, text: &str) -> Prompt {
    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: build_user_prompt(url, text),
    }
}

pub fn build_user_prompt(url: &str, text: &str) -> String {
    format!(
        r#"URL: {url}
Content: {text}

Please provide a comprehensive analysis in the following JSON format:
{{
  "score": <number between 0-100>,
  "currentKeywords": [list of 8-12 keywords currently present in the content],
  "highValueKeywords": [list of 8-12 high-CPC keywords relevant to this content niche],
  "recommendations": [list of 5-7 specific actionable recommendations],
  "estimatedCPCIncrease": <percentage as number>,
  "contentQuality": {{
    "score": <number 0-100>,
    "strengths": [list of 2-3 strengths],
    "improvements": [list of 2-3 areas for improvement]
  }},
  "competitiveKeywords": [list of 6-8 competitor keywords with high commercial intent],
  "semanticClusters": [list of 4-6 objects of the form {{ "theme": <cluster theme>, "keywords": [related keywords] }}]
}}

Focus on:
1. High commercial intent keywords
2. Long-tail keyword opportunities
3. Semantic relevance to existing content
4. CPC potential in the niche
5. Competition level analysis"#
    )
}
