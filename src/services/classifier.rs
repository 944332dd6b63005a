use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::Config;

/// Reply used when no API key is configured, so free text still gets an
/// answer instead of silence.
const NO_KEY_REPLY: &str =
    "🤖 Ainda não consigo conversar: o assistente de linguagem não está configurado.";
const ERROR_REPLY: &str =
    "😕 Não consegui processar sua mensagem agora. Tenta de novo em instantes?";

const SYSTEM_PROMPT: &str = r#"Você é o assistente pessoal do usuário em um bot de Telegram.
Classifique a mensagem em UMA das intenções abaixo e responda APENAS com um JSON válido, sem texto fora do JSON.

1. Registro financeiro:
{"intent": "finance_transaction", "kind": "entrada" | "saida", "amount": 123.45, "category": "Mercado", "category_emoji": "🛒", "description": "compras no mercado", "response": "Anotei R$ 123,45 em Mercado!"}

2. Registro de água:
{"intent": "water_intake", "amount_ml": 500, "response": "500ml registrados!"}

3. Conversa geral (qualquer outra coisa):
{"intent": "chat", "response": "sua resposta curta e simpática aqui"}

Regras:
- "amount" sempre em reais, número positivo.
- "amount_ml" sempre em mililitros.
- Omita "category" quando não tiver certeza.
- "response" é a frase curta mostrada ao usuário, em português."#;

/// What the model decided the user meant. Anything that is not a loggable
/// record comes back as plain chat.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    FinanceTransaction {
        kind: String,
        amount: f64,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        category_emoji: Option<String>,
        #[serde(default)]
        description: Option<String>,
        response: String,
    },
    WaterIntake {
        amount_ml: i64,
        response: String,
    },
    Chat {
        response: String,
    },
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Turns free text into an [`Intent`] via a chat-completions call. Never
/// fails outward: classification problems degrade to a chat reply.
pub struct IntentClassifier {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl IntentClassifier {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(IntentClassifier {
            client,
            api_key: config.classifier_api_key.clone(),
            model: config.classifier_model.clone(),
            base_url: config.classifier_base_url.clone(),
        })
    }

    pub async fn classify(&self, text: &str) -> Intent {
        let Some(api_key) = self.api_key.as_deref() else {
            return Intent::Chat {
                response: NO_KEY_REPLY.to_string(),
            };
        };

        match self.request(api_key, text).await {
            Ok(intent) => intent,
            Err(err) => {
                debug!("Intent classification failed: {}", err);
                Intent::Chat {
                    response: ERROR_REPLY.to_string(),
                }
            }
        }
    }

    async fn request(&self, api_key: &str, text: &str) -> Result<Intent> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": text},
            ],
            "temperature": 0.2,
            "max_tokens": 500,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let completion: ChatCompletion = response.json().await?;
        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| anyhow!("completion had no choices"))?;

        // A model that answered in prose instead of JSON is still a valid
        // chat reply.
        Ok(parse_intent(&content).unwrap_or_else(|| Intent::Chat { response: content }))
    }
}

/// Parses the model's JSON, tolerating a surrounding Markdown code fence.
pub fn parse_intent(content: &str) -> Option<Intent> {
    serde_json::from_str(strip_code_fence(content)).ok()
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_finance_transaction() {
        let content = r#"{"intent": "finance_transaction", "kind": "saida", "amount": 54.9, "category": "Mercado", "category_emoji": "🛒", "description": "feira", "response": "Anotei!"}"#;
        let intent = parse_intent(content).unwrap();
        assert_eq!(
            intent,
            Intent::FinanceTransaction {
                kind: "saida".to_string(),
                amount: 54.9,
                category: Some("Mercado".to_string()),
                category_emoji: Some("🛒".to_string()),
                description: Some("feira".to_string()),
                response: "Anotei!".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_finance_without_category() {
        let content =
            r#"{"intent": "finance_transaction", "kind": "entrada", "amount": 1500.0, "response": "Entrada registrada!"}"#;
        let intent = parse_intent(content).unwrap();
        match intent {
            Intent::FinanceTransaction { category, category_emoji, .. } => {
                assert_eq!(category, None);
                assert_eq!(category_emoji, None);
            }
            other => panic!("unexpected intent: {other:?}"),
        }
    }

    #[test]
    fn test_parse_water_intake() {
        let content = r#"{"intent": "water_intake", "amount_ml": 750, "response": "750ml!"}"#;
        assert_eq!(
            parse_intent(content).unwrap(),
            Intent::WaterIntake {
                amount_ml: 750,
                response: "750ml!".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_strips_code_fence() {
        let content = "```json\n{\"intent\": \"chat\", \"response\": \"Oi!\"}\n```";
        assert_eq!(
            parse_intent(content).unwrap(),
            Intent::Chat {
                response: "Oi!".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_bare_fence_without_language() {
        let content = "```\n{\"intent\": \"water_intake\", \"amount_ml\": 200, \"response\": \"ok\"}\n```";
        assert!(parse_intent(content).is_some());
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert_eq!(parse_intent("Bom dia! Como posso ajudar?"), None);
        assert_eq!(parse_intent(r#"{"intent": "unknown", "response": "?"}"#), None);
    }

    #[tokio::test]
    async fn test_classify_without_key_falls_back_to_chat() {
        let config = Config {
            telegram_bot_token: "token".to_string(),
            database_url: "sqlite::memory:".to_string(),
            http_port: 3000,
            user_display_name: "amigo".to_string(),
            water_goal_ml: 4000,
            utc_offset_hours: -3,
            hub_refresh_secs: 2,
            deploy_webhook_secret: None,
            deploy_command: None,
            classifier_api_key: None,
            classifier_model: "sonar-pro".to_string(),
            classifier_base_url: "https://api.perplexity.ai".to_string(),
        };
        let classifier = IntentClassifier::new(&config).unwrap();

        match classifier.classify("quanto é 2 + 2?").await {
            Intent::Chat { response } => assert!(response.contains("não está configurado")),
            other => panic!("unexpected intent: {other:?}"),
        }
    }
}
