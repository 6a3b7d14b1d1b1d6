//! Domain prompt templates and their input records.
//!
//! Template text is domain configuration, not algorithmic core: the builders
//! fix the structure (which fields are filled in, history window, truncation)
//! while the wording is swappable.

use serde::{Deserialize, Serialize};

/// How many history entries are included in a recommendation prompt.
const HISTORY_WINDOW: usize = 5;

/// How many characters of learning content are sent for analysis.
const ANALYSIS_CONTENT_LIMIT: usize = 1000;

/// A user's learning profile, as delivered by the platform.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Learning profile label (e.g. "visual", "hands-on").
    #[serde(default)]
    pub perfil_aprend: Option<String>,
    #[serde(default)]
    pub enrolled_trilhas_count: u32,
    #[serde(default)]
    pub learning_analytics: LearningAnalytics,
}

/// Aggregated study metrics for a user.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LearningAnalytics {
    /// Completion rate in percent.
    #[serde(default)]
    pub completion_rate: f64,
    /// Consecutive study days.
    #[serde(default)]
    pub learning_streak: u32,
    /// Average study time in hours per day.
    #[serde(default)]
    pub daily_average_study_time: f64,
}

/// One entry of a user's learning history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub titulo: String,
    /// Progress in percent.
    #[serde(default)]
    pub progresso: f64,
}

/// Conversation context for chatbot replies.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatContext {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub current_course: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

/// Quiz difficulty levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Iniciante,
    Intermediario,
    Avancado,
}

impl Difficulty {
    /// Maps a free-form difficulty value through the fixed lookup.
    ///
    /// Unrecognized values fall back to [`Difficulty::Iniciante`].
    pub fn parse_lossy(value: &str) -> Self {
        match value {
            "intermediario" => Self::Intermediario,
            "avancado" => Self::Avancado,
            _ => Self::Iniciante,
        }
    }

    /// Portuguese description used inside quiz prompts.
    pub fn description(self) -> &'static str {
        match self {
            Self::Iniciante => "nível iniciante (conceitos básicos, exemplos simples)",
            Self::Intermediario => {
                "nível intermediário (conceitos mais complexos, aplicações práticas)"
            }
            Self::Avancado => "nível avançado (conceitos especializados, cenários complexos)",
        }
    }
}

/// Builds the personalized-recommendation prompt from a profile and the last
/// five history entries.
pub fn build_recommendation_prompt(profile: &UserProfile, history: &[HistoryEntry]) -> String {
    let analytics = &profile.learning_analytics;
    let profile_text = format!(
        "Perfil do Usuário:\n\
         - Nome: {}\n\
         - Perfil de Aprendizado: {}\n\
         - Email: {}\n\
         - Trilhas Inscritas: {}",
        profile.nome.as_deref().unwrap_or("Desconhecido"),
        profile.perfil_aprend.as_deref().unwrap_or("Não especificado"),
        profile.email.as_deref().unwrap_or("Não fornecido"),
        profile.enrolled_trilhas_count,
    );

    let window = &history[history.len().saturating_sub(HISTORY_WINDOW)..];
    let mut history_text = String::from("Histórico de Aprendizado:\n");
    for item in window {
        history_text.push_str(&format!(
            "- {}: Progresso {}%\n",
            item.titulo, item.progresso
        ));
    }

    let analytics_text = format!(
        "Analytics de Aprendizado:\n\
         - Taxa de Conclusão: {}%\n\
         - Sequência de Dias: {} dias\n\
         - Tempo Médio de Estudo: {} horas/dia",
        analytics.completion_rate, analytics.learning_streak, analytics.daily_average_study_time,
    );

    format!(
        "Você é um assistente de aprendizado IA para uma plataforma de e-learning. \
         Com base no perfil e histórico do usuário, recomende materiais de aprendizado \
         EXTERNOS (recursos gratuitos, vídeos do YouTube, cursos online, artigos, etc.) \
         que o usuário possa procurar e estudar.\n\n\
         {profile_text}\n\n\
         {history_text}\n\
         {analytics_text}\n\n\
         IMPORTANTE: Retorne um objeto JSON com a seguinte estrutura:\n\
         {{\n\
         \x20 \"material_recommendations\": [\n\
         \x20   {{\n\
         \x20     \"title\": \"Título/Nome do material recomendado\",\n\
         \x20     \"type\": \"youtube|course|article|documentation|video|ebook|tutorial\",\n\
         \x20     \"description\": \"Breve descrição do que este material cobre\",\n\
         \x20     \"reason\": \"Por que isso é recomendado para este usuário\",\n\
         \x20     \"url\": \"APENAS se você tiver uma URL específica e verificada. Caso contrário, deixe vazio.\",\n\
         \x20     \"search_terms\": \"OBRIGATÓRIO: Termos de busca específicos para encontrar este material\",\n\
         \x20     \"difficulty\": \"iniciante|intermediario|avancado\",\n\
         \x20     \"estimated_time\": \"Tempo estimado para completar\",\n\
         \x20     \"free\": true,\n\
         \x20     \"confidence\": 0.85\n\
         \x20   }}\n\
         \x20 ],\n\
         \x20 \"learning_path_suggestions\": \"Texto breve sobre sugestões de caminhos de aprendizado\",\n\
         \x20 \"study_schedule\": \"Texto breve sobre recomendações de cronograma de estudos\",\n\
         \x20 \"improvement_areas\": \"Texto breve sobre áreas de melhoria\",\n\
         \x20 \"general_insights\": \"Insights gerais personalizados sobre o aprendizado do usuário\"\n\
         }}\n\n\
         Forneça 4-6 recomendações específicas de materiais externos baseadas no nível \
         atual do usuário ({level}), seu histórico de progresso e seus analytics.\n\n\
         REGRAS IMPORTANTES:\n\
         - SEMPRE forneça o campo \"search_terms\" com termos específicos e pesquisáveis\n\
         - Inclua o campo \"url\" apenas se tiver 100% de certeza de que a URL existe\n\
         - Torne os termos de busca específicos e acionáveis (2-5 palavras, tópico claro)\n\n\
         Retorne APENAS JSON válido, sem texto adicional.",
        level = profile.perfil_aprend.as_deref().unwrap_or("beginner"),
    )
}

/// Builds the chatbot prompt from the raw question and conversation context.
pub fn build_chatbot_prompt(question: &str, context: &ChatContext) -> String {
    format!(
        "You are a helpful AI assistant for an e-learning platform. Answer the \
         user's question in a friendly, educational manner. Provide clear, \
         concise, and helpful responses.\n\n\
         Context:\n\
         - User: {user}\n\
         - Current Course: {course}\n\
         - Learning Level: {level}\n\n\
         User Question: {question}\n\n\
         Provide a helpful response that encourages learning and provides \
         actionable advice when possible.",
        user = context.user_name.as_deref().unwrap_or("Student"),
        course = context.current_course.as_deref().unwrap_or("None"),
        level = context.level.as_deref().unwrap_or("Beginner"),
    )
}

/// Builds the quiz-generation prompt demanding a strict JSON array of
/// `count` five-option multiple-choice questions.
pub fn build_quiz_prompt(
    topic: &str,
    difficulty: Difficulty,
    module_title: &str,
    count: u32,
) -> String {
    format!(
        "Crie {count} questões de múltipla escolha sobre \"{topic}\" com foco em \
         \"{module_title}\" para {difficulty}.\n\n\
         Cada questão deve ter:\n\
         - Uma pergunta clara e objetiva\n\
         - 5 alternativas (a, b, c, d, e)\n\
         - Apenas uma resposta correta\n\
         - Explicação detalhada da resposta correta\n\n\
         IMPORTANTE: Retorne APENAS um JSON válido no seguinte formato:\n\
         [\n\
         \x20 {{\n\
         \x20   \"pergunta\": \"Texto da pergunta aqui\",\n\
         \x20   \"alternativas\": {{\n\
         \x20     \"a\": \"Primeira opção\",\n\
         \x20     \"b\": \"Segunda opção\",\n\
         \x20     \"c\": \"Terceira opção\",\n\
         \x20     \"d\": \"Quarta opção\",\n\
         \x20     \"e\": \"Quinta opção\"\n\
         \x20   }},\n\
         \x20   \"resposta_correta\": \"a\",\n\
         \x20   \"explicacao\": \"Explicação detalhada da resposta correta\"\n\
         \x20 }}\n\
         ]\n\n\
         Não inclua texto adicional, apenas o JSON válido com {count} questões.",
        difficulty = difficulty.description(),
    )
}

/// Builds the content-analysis prompt, truncating the content to its first
/// 1000 characters to bound prompt size.
pub fn build_analysis_prompt(content: &str, content_type: &str) -> String {
    let excerpt: String = content.chars().take(ANALYSIS_CONTENT_LIMIT).collect();
    format!(
        "Analyze the following {content_type} learning content and provide:\n\
         1. Difficulty level (beginner, intermediate, advanced)\n\
         2. Main topics covered\n\
         3. Estimated study time\n\
         4. Prerequisites\n\
         5. Learning objectives\n\n\
         Content: {excerpt}\n\n\
         Provide the analysis in JSON format.",
    )
}

#[cfg(test)]
mod tests {
    use super::{
        build_analysis_prompt, build_quiz_prompt, build_recommendation_prompt, ChatContext,
        Difficulty, HistoryEntry, UserProfile,
    };

    #[test]
    fn parse_lossy_defaults_unknown_values_to_iniciante() {
        assert_eq!(Difficulty::parse_lossy("avancado"), Difficulty::Avancado);
        assert_eq!(
            Difficulty::parse_lossy("intermediario"),
            Difficulty::Intermediario
        );
        assert_eq!(Difficulty::parse_lossy("iniciante"), Difficulty::Iniciante);
        assert_eq!(Difficulty::parse_lossy("expert"), Difficulty::Iniciante);
        assert_eq!(Difficulty::parse_lossy(""), Difficulty::Iniciante);
    }

    #[test]
    fn recommendation_prompt_keeps_only_last_five_history_entries() {
        let history: Vec<HistoryEntry> = (1..=7)
            .map(|i| HistoryEntry {
                titulo: format!("Trilha {i}"),
                progresso: 10.0 * f64::from(i),
            })
            .collect();
        let prompt = build_recommendation_prompt(&UserProfile::default(), &history);

        assert!(!prompt.contains("Trilha 1:"));
        assert!(!prompt.contains("Trilha 2:"));
        assert!(prompt.contains("Trilha 3"));
        assert!(prompt.contains("Trilha 7"));
    }

    #[test]
    fn recommendation_prompt_fills_profile_defaults() {
        let prompt = build_recommendation_prompt(&UserProfile::default(), &[]);
        assert!(prompt.contains("Nome: Desconhecido"));
        assert!(prompt.contains("Perfil de Aprendizado: Não especificado"));
        assert!(prompt.contains("Email: Não fornecido"));
    }

    #[test]
    fn chatbot_prompt_falls_back_to_default_context() {
        let prompt = super::build_chatbot_prompt("O que é Rust?", &ChatContext::default());
        assert!(prompt.contains("User: Student"));
        assert!(prompt.contains("Current Course: None"));
        assert!(prompt.contains("Learning Level: Beginner"));
        assert!(prompt.contains("User Question: O que é Rust?"));
    }

    #[test]
    fn quiz_prompt_embeds_count_topic_and_difficulty() {
        let prompt = build_quiz_prompt("Python", Difficulty::Avancado, "Funções", 3);
        assert!(prompt.contains("Crie 3 questões"));
        assert!(prompt.contains("\"Python\""));
        assert!(prompt.contains("\"Funções\""));
        assert!(prompt.contains("nível avançado"));
    }

    #[test]
    fn analysis_prompt_truncates_to_first_thousand_chars() {
        let content = "é".repeat(1500);
        let prompt = build_analysis_prompt(&content, "text");
        let embedded = prompt.matches('é').count();
        assert_eq!(embedded, 1000);
    }
}
