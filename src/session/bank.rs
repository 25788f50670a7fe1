//! Built-in question bank, used when no generated question set is
//! available (collaborator unreachable, or nothing to generate from).

use rand::seq::SliceRandom;

/// Category of a bank question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionCategory {
    /// Computer-science / technical prompts
    Technical,
    /// Behavioral / HR prompts
    Behavioral,
}

/// A canned interview question.
#[derive(Debug, Clone, Copy)]
pub struct BankQuestion {
    pub id: &'static str,
    pub category: QuestionCategory,
    pub prompt: &'static str,
}

pub const QUESTION_BANK: &[BankQuestion] = &[
    BankQuestion {
        id: "disagreements",
        category: QuestionCategory::Behavioral,
        prompt: "How do you handle disagreements within your team?",
    },
    BankQuestion {
        id: "project",
        category: QuestionCategory::Behavioral,
        prompt: "Describe a challenging technical project you led.",
    },
    BankQuestion {
        id: "skills",
        category: QuestionCategory::Behavioral,
        prompt: "How do you keep your skills updated?",
    },
    BankQuestion {
        id: "motivation",
        category: QuestionCategory::Behavioral,
        prompt: "What motivates you in your work?",
    },
    BankQuestion {
        id: "leadership",
        category: QuestionCategory::Behavioral,
        prompt: "Tell me about a time you showed leadership.",
    },
    BankQuestion {
        id: "bug",
        category: QuestionCategory::Technical,
        prompt: "Explain a difficult bug you've fixed.",
    },
    BankQuestion {
        id: "priorities",
        category: QuestionCategory::Behavioral,
        prompt: "How do you prioritize tasks?",
    },
    BankQuestion {
        id: "remote",
        category: QuestionCategory::Behavioral,
        prompt: "Describe your experience with remote collaboration.",
    },
    BankQuestion {
        id: "deadlines",
        category: QuestionCategory::Behavioral,
        prompt: "How do you deal with tight deadlines?",
    },
    BankQuestion {
        id: "learning",
        category: QuestionCategory::Behavioral,
        prompt: "What is your approach to learning new technologies?",
    },
    BankQuestion {
        id: "lru",
        category: QuestionCategory::Technical,
        prompt: "Pitch the LRU cache in 60 seconds or less.",
    },
    BankQuestion {
        id: "stack",
        category: QuestionCategory::Technical,
        prompt: "Explain how a stack works.",
    },
    BankQuestion {
        id: "scheduling",
        category: QuestionCategory::Technical,
        prompt: "What is process scheduling in an operating system?",
    },
    BankQuestion {
        id: "strength",
        category: QuestionCategory::Behavioral,
        prompt: "What are your key strengths?",
    },
    BankQuestion {
        id: "weakness",
        category: QuestionCategory::Behavioral,
        prompt: "What's a weakness you're working on?",
    },
];

/// Sample up to `count` distinct prompts from the bank, in random order.
pub fn fallback_questions(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    QUESTION_BANK
        .choose_multiple(&mut rng, count)
        .map(|q| q.prompt.to_string())
        .collect()
}
