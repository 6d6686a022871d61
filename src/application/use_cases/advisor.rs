use crate::domain::chat::ChatMessage;
use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use crate::domain::project::Project;
use crate::infrastructure::llm_clients::sse::accumulate_sse;
use crate::infrastructure::llm_clients::{ByteStream, LLMClient};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Idea the advisor conversation is currently anchored on.
#[derive(Debug, Deserialize, Clone)]
pub struct IdeaContext {
    pub title: String,
    pub content: String,
    pub category: String,
    pub status: String,
}

pub struct AdvisorChatUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
}

impl AdvisorChatUseCase {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, config: LLMConfig) -> Self {
        Self { llm_client, config }
    }

    /// Raw SSE stream of the advisor reply, for callers that relay the
    /// stream. Dropping the stream aborts the upstream request.
    pub async fn stream(
        &self,
        messages: &[ChatMessage],
        idea: Option<&IdeaContext>,
        dashboard_context: Option<&str>,
    ) -> Result<ByteStream> {
        let system = advisor_system_prompt(idea, dashboard_context);
        self.llm_client
            .stream_chat(&self.config, &system, messages)
            .await
    }

    /// Accumulates the whole advisor reply server-side into one assistant
    /// message.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        idea: Option<&IdeaContext>,
        dashboard_context: Option<&str>,
    ) -> Result<ChatMessage> {
        let stream = self.stream(messages, idea, dashboard_context).await?;
        let content = accumulate_sse(stream, |delta| {
            debug!(len = delta.len(), "Advisor delta received");
        })
        .await?;
        Ok(ChatMessage::assistant(content))
    }

    /// Project-boss variant: same streaming contract, system prompt built
    /// from the project record instead of idea context.
    pub async fn stream_project_boss(
        &self,
        project: &Project,
        messages: &[ChatMessage],
    ) -> Result<ByteStream> {
        let system = project_boss_system_prompt(project);
        self.llm_client
            .stream_chat(&self.config, &system, messages)
            .await
    }

    pub async fn complete_project_boss(
        &self,
        project: &Project,
        messages: &[ChatMessage],
    ) -> Result<ChatMessage> {
        let stream = self.stream_project_boss(project, messages).await?;
        let content = accumulate_sse(stream, |delta| {
            debug!(len = delta.len(), "Project boss delta received");
        })
        .await?;
        Ok(ChatMessage::assistant(content))
    }
}

fn advisor_system_prompt(idea: Option<&IdeaContext>, dashboard_context: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are a Business Advisor AI assistant for DeepFlow, an automation agency dashboard. \
         You act as a personal assistant and business advisor, helping the user brainstorm, plan, \
         and refine ideas.\n\n\
         Your role is to:\n\
         1. Help brainstorm and expand on business ideas\n\
         2. Provide strategic advice on feature development\n\
         3. Suggest implementation approaches\n\
         4. Help prioritize and plan work\n\
         5. Offer insights on automation workflows and client management\n\
         6. Act as a sounding board for new concepts\n\n\
         Context about the DeepFlow dashboard:\n\
         - It's a CRM/project management tool for an automation agency\n\
         - It integrates with Google Sheets for client data\n\
         - It has AI agents for workflow building, dashboard generation, and mockup previews\n\
         - The system generates n8n workflows and client dashboard specs\n",
    );

    if let Some(context) = dashboard_context {
        prompt.push_str(&format!("\nAdditional context:\n{}\n", context));
    }

    if let Some(idea) = idea {
        prompt.push_str(&format!(
            "\nCurrently discussing idea:\n\
             - Title: {}\n\
             - Content: {}\n\
             - Category: {}\n\
             - Status: {}\n",
            idea.title, idea.content, idea.category, idea.status
        ));
    }

    prompt.push_str(
        "\nBe conversational, helpful, and proactive. Suggest follow-up questions and action \
         items. If discussing features, consider technical feasibility and user value.",
    );
    prompt
}

fn project_boss_system_prompt(project: &Project) -> String {
    format!(
        "You are the Project Boss for DeepFlow, an automation agency dashboard. You answer \
         operator questions about a single client project: its status, build plan, blockers, \
         and next actions. Be direct and concrete.\n\n\
         Project context:\n\
         - Client: {}\n\
         - Status: {}\n\
         - Revenue value: {}\n\
         - Phase: {}\n\
         - Challenges: {}\n\
         - Desired outcomes: {}\n\
         - Notes: {}",
        project.client_name,
        project.status.as_str(),
        project.revenue_value,
        project.phase,
        project
            .current_challenges
            .as_deref()
            .unwrap_or("Not specified"),
        project
            .desired_outcomes
            .as_deref()
            .unwrap_or("Not specified"),
        project.notes.as_deref().unwrap_or("None"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm_clients::testing::ScriptedClient;

    fn sse_chunk(text: &str) -> Vec<u8> {
        format!(
            "data: {}\n",
            serde_json::json!({ "choices": [{ "delta": { "content": text } }] })
        )
        .into_bytes()
    }

    #[tokio::test]
    async fn test_complete_accumulates_streamed_reply() {
        let client = Arc::new(ScriptedClient::streaming(vec![
            sse_chunk("Plan "),
            sse_chunk("the "),
            sse_chunk("rollout."),
            b"data: [DONE]\n".to_vec(),
        ]));
        let use_case = AdvisorChatUseCase::new(client, LLMConfig::default());

        let reply = use_case
            .complete(&[ChatMessage::user("What next?")], None, None)
            .await
            .unwrap();
        assert_eq!(reply.content, "Plan the rollout.");
    }

    #[tokio::test]
    async fn test_idea_context_shapes_system_prompt() {
        let client = Arc::new(ScriptedClient::streaming(vec![sse_chunk("ok")]));
        let use_case = AdvisorChatUseCase::new(client.clone(), LLMConfig::default());

        let idea = IdeaContext {
            title: "Automate invoicing".to_string(),
            content: "Send invoices from n8n".to_string(),
            category: "billing".to_string(),
            status: "planning".to_string(),
        };
        use_case
            .complete(&[ChatMessage::user("thoughts?")], Some(&idea), Some("Q3 focus"))
            .await
            .unwrap();

        let system = client.last_system.lock().unwrap().clone().unwrap();
        assert!(system.contains("Automate invoicing"));
        assert!(system.contains("Q3 focus"));
    }

    #[tokio::test]
    async fn test_project_boss_prompt_carries_project_fields() {
        let client = Arc::new(ScriptedClient::streaming(vec![sse_chunk("on track")]));
        let use_case = AdvisorChatUseCase::new(client.clone(), LLMConfig::default());

        let mut project = Project::new(
            "p1".to_string(),
            "2026-01-01T00:00:00Z".to_string(),
            "Oak & Sons".to_string(),
            "ops@oak.example".to_string(),
        );
        project.current_challenges = Some("manual quoting".to_string());

        let reply = use_case
            .complete_project_boss(&project, &[ChatMessage::user("status?")])
            .await
            .unwrap();
        assert_eq!(reply.content, "on track");

        let system = client.last_system.lock().unwrap().clone().unwrap();
        assert!(system.contains("Oak & Sons"));
        assert!(system.contains("manual quoting"));
    }
}
