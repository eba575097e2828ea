//! Vocabulary for the synthetic data generator.

pub(crate) const FIRST_NAMES: &[&str] = &[
    "Alice", "Andrew", "Anna", "Benjamin", "Bohdan", "Carla", "Christopher", "Daniel", "Diana",
    "Elena", "Emily", "Frank", "Gabriel", "Grace", "Hannah", "Henry", "Irene", "Isaac", "Jacob",
    "Julia", "Kateryna", "Kevin", "Laura", "Liam", "Maria", "Matthew", "Nadia", "Nathan", "Olena",
    "Oliver", "Paula", "Peter", "Quinn", "Rachel", "Robert", "Sofia", "Samuel", "Taras", "Tina",
    "Victor", "Wendy", "William", "Yana", "Zachary",
];

pub(crate) const LAST_NAMES: &[&str] = &[
    "Adams", "Baker", "Bondarenko", "Campbell", "Carter", "Davis", "Evans", "Fisher", "Garcia",
    "Hall", "Harris", "Hughes", "Johnson", "Kovalenko", "Kowalski", "Lewis", "Lopez", "Martin",
    "Melnyk", "Miller", "Mitchell", "Nelson", "Parker", "Perez", "Roberts", "Robinson", "Shevchenko",
    "Smith", "Stewart", "Taylor", "Thompson", "Turner", "Walker", "White", "Wilson", "Young",
];

pub(crate) const EMAIL_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "example.net",
    "mail.example.com",
    "test.example.org",
];

pub(crate) const WORDS: &[&str] = &[
    "account", "action", "agent", "answer", "article", "attention", "budget", "build", "career",
    "change", "choice", "church", "client", "common", "course", "culture", "data", "decide",
    "design", "detail", "develop", "director", "discuss", "draft", "east", "economy", "effort",
    "energy", "event", "evidence", "factor", "feature", "figure", "final", "focus", "goal", "group",
    "growth", "history", "idea", "image", "impact", "issue", "job", "keep", "language", "leader",
    "level", "list", "manage", "market", "measure", "meeting", "method", "model", "month", "network",
    "office", "option", "order", "paper", "partner", "plan", "policy", "process", "product",
    "project", "quality", "question", "reason", "record", "report", "research", "review", "risk",
    "schedule", "season", "service", "share", "simple", "site", "skill", "source", "staff",
    "standard", "state", "strategy", "study", "system", "team", "test", "theory", "topic", "track",
    "update", "value", "version", "view", "week", "window", "work", "write",
];
