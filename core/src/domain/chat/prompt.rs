use crate::domain::{
    analysis::entities::{AnalysisResult, UserProfile},
    chat::value_objects::{RelayChatInput, UpstreamMessage, UpstreamRole},
};

pub const SYSTEM_PROMPT: &str = "You are NutriScan AI, a friendly and knowledgeable food ingredient expert. You're having a conversation with someone about ingredients they've scanned.

You have access to the ingredient analysis results and should help the user understand:
- Specific ingredients they ask about
- How ingredients relate to their dietary needs
- Practical advice about the product
- Whether alternatives might be better

COMMUNICATION STYLE:
- Be conversational and helpful
- Use simple language, avoid jargon
- Be honest about uncertainty
- Give practical, actionable advice
- Keep responses concise (2-4 sentences usually)

If asked about something outside your expertise or the current analysis, politely redirect to the ingredients at hand.";

/// Renders the analysis, profile and raw ingredient text appended to the
/// system instruction.
pub fn render_context_block(
    analysis: &AnalysisResult,
    profile: &UserProfile,
    ingredients: &str,
) -> String {
    let analyzed = analysis
        .ingredients
        .iter()
        .map(|ingredient| format!("{} ({})", ingredient.name, ingredient.level))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "\nCURRENT ANALYSIS CONTEXT:\n\
         - Product Score: {}/100 ({})\n\
         - Summary: {}\n\
         - Ingredients analyzed: {}\n\
         \n\
         USER PROFILE:\n\
         - Allergies: {}\n\
         - Dietary restrictions: {}\n\
         - Health goals: {}\n\
         \n\
         ORIGINAL INGREDIENTS:\n\
         {}\n",
        analysis.overall_score,
        analysis.verdict,
        analysis.summary,
        analyzed,
        list_or_none(&profile.allergies),
        list_or_none(&profile.dietary_restrictions),
        list_or_none(&profile.health_goals),
        ingredients,
    )
}

fn list_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "None".to_string()
    } else {
        values.join(", ")
    }
}

/// System instruction with context, then the prior turns in order, then the
/// new user message.
pub fn build_upstream_messages(input: &RelayChatInput) -> Vec<UpstreamMessage> {
    let context = render_context_block(&input.analysis, &input.profile, &input.ingredients);

    let mut messages = Vec::with_capacity(input.history.len() + 2);
    messages.push(UpstreamMessage::new(
        UpstreamRole::System,
        format!("{SYSTEM_PROMPT}\n\n{context}"),
    ));
    messages.extend(
        input
            .history
            .iter()
            .map(|turn| UpstreamMessage::new(turn.role.into(), turn.content.clone())),
    );
    messages.push(UpstreamMessage::new(
        UpstreamRole::User,
        input.message.clone(),
    ));

    messages
}
