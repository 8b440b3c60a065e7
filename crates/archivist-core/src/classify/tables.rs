//! Keyword and pattern tables driving the classifier and extractor.
//!
//! Keywords are matched as substrings of tokens made of `[a-z0-9$]`, so every
//! keyword here is a single lower-case token.

/// A named topic label backed by a keyword list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeBucket {
    pub label: &'static str,
    pub keywords: &'static [&'static str],
    /// Minimum score for the label to be reported.
    pub min_hits: usize,
}

impl ThemeBucket {
    const fn new(label: &'static str, keywords: &'static [&'static str]) -> Self {
        Self {
            label,
            keywords,
            min_hits: 1,
        }
    }

    const fn strict(label: &'static str, keywords: &'static [&'static str]) -> Self {
        Self {
            label,
            keywords,
            min_hits: 2,
        }
    }
}

/// Theme used when nothing else can be said.
pub const GENERAL_DISCOURSE: &str = "general discourse";

/// Token excluded from the frequency fallback.
pub const SELF_REFERENCE: &str = "archivist";

/// Default theme table, in tie-break order.
pub const THEME_BUCKETS: &[ThemeBucket] = &[
    ThemeBucket::new(
        "setup",
        &["install", "npm", "node", "pm2", "script", "cmd", "bat", "powershell", "terminal", "console"],
    ),
    ThemeBucket::new(
        "deploy",
        &["railway", "netlify", "deploy", "build", "prod", "host", "server", "webhook"],
    ),
    ThemeBucket::new("git", &["git", "commit", "push", "pull", "branch", "repo", "github"]),
    ThemeBucket::new(
        "files",
        &["path", "folder", "file", "zip", "copy", "move", "rename", "env"],
    ),
    ThemeBucket::new(
        "planning",
        &["next", "later", "roadmap", "plan", "idea", "feature", "premium", "pricing", "positioning"],
    ),
    ThemeBucket::new(
        "scheduling",
        &["today", "tonight", "tomorrow", "week", "month", "hour", "minute", "schedule", "meet", "call"],
    ),
    ThemeBucket::new(
        "money",
        &["$", "dollar", "price", "pay", "cost", "budget", "free", "trial", "credit"],
    ),
    ThemeBucket::new(
        "theology",
        &[
            "bible", "scripture", "gospel", "church", "pastor", "sermon", "theology", "doctrine",
            "jesus", "christ", "prayer", "pray", "salvation", "grace", "faith", "holy", "spirit",
            "discipleship", "worship", "baptism", "communion", "eucharist", "trinity",
            "apologetics", "mission",
        ],
    ),
    ThemeBucket::new(
        "politics",
        &[
            "election", "vote", "senate", "congress", "president", "policy", "democrat",
            "republican", "campaign", "legislation", "bill", "law", "court", "supreme",
            "administration", "governor", "mayor",
        ],
    ),
    ThemeBucket::new(
        "geopolitics",
        &[
            "nato", "ukraine", "russia", "china", "taiwan", "iran", "israel", "gaza", "hamas",
            "hezbollah", "sanction", "border", "coup", "embassy", "proxy", "pipeline",
            "intelligence", "defense", "military", "war", "ceasefire", "missile", "drone",
        ],
    ),
    ThemeBucket::new(
        "technology",
        &[
            "gpt", "llm", "model", "api", "code", "coding", "javascript", "node", "python", "react",
            "github", "server", "cloud", "security", "database", "bug", "feature", "update",
            "version", "prompt",
        ],
    ),
    ThemeBucket::new(
        "finance",
        &[
            "stock", "etf", "bond", "yield", "inflation", "rates", "fed", "earnings", "revenue",
            "profit", "loss", "bitcoin", "crypto", "wallet", "taxes", "budget", "invest",
            "portfolio", "market", "recession",
        ],
    ),
    ThemeBucket::new(
        "relationships",
        &[
            "relationship", "dating", "marriage", "married", "spouse", "husband", "wife",
            "partner", "boyfriend", "girlfriend", "fiance", "engagement", "breakup", "divorce",
            "argument", "apology", "forgiveness", "conflict", "communication", "boundar",
            "counseling", "therap", "intimacy", "trust", "respect", "parenting", "family",
        ],
    ),
    ThemeBucket::new(
        "aging_and_aches",
        &[
            "40s", "forties", "aging", "older", "tired", "fatigue", "sore", "aches", "aching",
            "pain", "chronic", "neck", "knee", "joint", "inflammation", "stiff", "sciatica",
            "migraine", "headache", "sleep", "insomnia", "recovery", "chiropractor", "ibuprofen",
            "naproxen",
        ],
    ),
    ThemeBucket::strict(
        "venting",
        &[
            "ugh", "annoyed", "frustrated", "irritated", "unbelievable", "complaining", "rant",
            "vent", "stressed", "burnout", "overwhelmed", "done",
        ],
    ),
    ThemeBucket::new(
        "sports",
        &[
            "nfl", "nba", "mlb", "nhl", "ncaa", "football", "basketball", "baseball", "hockey",
            "soccer", "match", "game", "score", "playoff", "draft", "season", "coach", "team",
            "quarterback", "touchdown",
        ],
    ),
    ThemeBucket::new(
        "tv_movies",
        &[
            "movie", "film", "show", "series", "episode", "season", "actor", "actress", "director",
            "trailer", "netflix", "hbo", "disney", "prime", "cinema",
        ],
    ),
    ThemeBucket::new(
        "fitness",
        &[
            "workout", "gym", "lift", "run", "cardio", "strength", "reps", "squat", "bench",
            "deadlift", "training", "mobility",
        ],
    ),
    ThemeBucket::new(
        "diet",
        &[
            "diet", "calories", "protein", "carbs", "fasting", "keto", "paleo", "vegan",
            "vegetarian", "macros", "supplement", "nutrition", "meal",
        ],
    ),
    ThemeBucket::new(
        "places",
        &[
            "texas", "dfw", "dallas", "austin", "houston", "ohio", "cleveland", "columbus",
            "cincinnati", "capitol",
        ],
    ),
    ThemeBucket::new(
        "memories",
        &["remember", "memories", "memory", "nostalgia", "childhood"],
    ),
    ThemeBucket::new(
        "humor",
        &["lol", "haha", "meme", "joke", "funny", "deadpan", "smirk", "pun"],
    ),
];

/// Tokens ignored when scoring themes.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "could", "did", "do", "does",
    "for", "from", "had", "has", "have", "he", "her", "hers", "him", "his", "i", "if", "in",
    "into", "is", "it", "its", "just", "like", "me", "more", "most", "my", "no", "not", "of",
    "on", "or", "our", "ours", "please", "she", "so", "some", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "to", "too", "up", "us", "was", "we",
    "were", "what", "when", "where", "which", "who", "why", "will", "with", "would", "you",
    "your", "yours",
];

/// Explicit commitment language.
pub const HARD_DECISION_PATTERNS: &[&str] = &[
    r"\bdecided\b",
    r"\blocked in\b",
    r"\bconfirmed\b",
    r"\bwe will\b",
    r"\bwe['’]re going to\b",
    r"\bship it\b",
    r"\bdone deal\b",
];

/// Softer statements of intent.
pub const SOFT_DECISION_PATTERNS: &[&str] = &[
    r"\blet['’]s\b",
    r"\bwe should\b",
    r"\bplan to\b",
    r"\bnext step\b",
    r"\bi will\b",
    r"\bwe need to\b",
];

/// Interrogative openers; any text containing `?` is also a question.
pub const QUESTION_LEAD_PATTERN: &str =
    r"^(who|what|when|where|why|how|anyone|can we|should we|are we)\b";

/// Words hinting at concrete arrangements.
pub const LOGISTICS_PATTERN: &str = r"\b(time|when|where|address|link|cost|price|ride)\b";

/// Words hinting at casual banter.
pub const VIBES_PATTERN: &str = r"\b(lol|haha|lmao|rip|bro|ok|nice|wild)\b";

/// Phrasing that leaves something open for later.
pub const LOOSE_END_PATTERNS: &[&str] = &[
    r"\bwe should\b",
    r"\bwe need to\b",
    r"\bnext step\b",
    r"\btodo\b",
    r"\bto do\b",
    r"\bfollow up\b",
    r"\bremind me\b",
    r"\bcan you\b",
    r"\bcould you\b",
    r"\bplease\b",
    r"\blet['’]s\b",
];

/// Phrasing that records an outcome.
pub const DECISION_EXTRACT_PATTERNS: &[&str] = &[
    r"\bdecided\b",
    r"\bconfirmed\b",
    r"\blocked in\b",
    r"\bwe will\b",
    r"\bwe['’]re going to\b",
    r"\bship it\b",
    r"\bdone deal\b",
    r"\bfinal\b",
    r"\bagreed\b",
];
