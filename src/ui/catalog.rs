use crate::backend::wire::LocalModel;
use std::fmt;

pub const UNKNOWN_MODEL_NAME: &str = "Unknown SLM";
pub const DEFAULT_TOP_K: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub family: &'static str,
    pub size: &'static str,
    pub quantization: &'static str,
    pub price_label: &'static str,
    pub description: &'static str,
    pub why_use: &'static str,
    pub best_for: &'static str,
    pub strengths: &'static [&'static str],
    pub download_url: &'static str,
    pub command: &'static str,
    pub mandatory: bool,
    pub loaded_by_default: bool,
}

static CATALOG: [ModelDescriptor; 5] = [
    ModelDescriptor {
        id: "llama-3.2-3b",
        name: "Llama 3.2 3B Instruct",
        family: "Llama",
        size: "3B",
        quantization: "Q4_K_M GGUF",
        price_label: "Included",
        description: "Balanced quality and speed for local retrieval-augmented chats. Mandatory baseline model in this workspace.",
        why_use: "Perfect to get started: free, fast, and ideal for everyday conversations with your documents.",
        best_for: "Pick it for a stable model that handles most PDFs without fuss.",
        strengths: &["Very versatile", "Fast locally", "Excellent baseline model"],
        download_url: "https://huggingface.co/bartowski/Llama-3.2-3B-Instruct-GGUF",
        command: "huggingface-cli download bartowski/Llama-3.2-3B-Instruct-GGUF --include \"*Q4_K_M.gguf\" --local-dir ./models/llama-3.2-3b",
        mandatory: true,
        loaded_by_default: true,
    },
    ModelDescriptor {
        id: "phi-3.5-mini",
        name: "Phi 3.5 Mini Instruct",
        family: "Phi",
        size: "3.8B",
        quantization: "Q4_K_M GGUF",
        price_label: "€9 / month",
        description: "Compact SLM tuned for concise and structured responses with strong latency.",
        why_use: "Ideal for quick and structured responses: lightweight, efficient, perfect for simple and fast tasks.",
        best_for: "Pick it for short, clear, immediate answers over simple documents.",
        strengths: &["Low latency", "Structured", "Light on resources"],
        download_url: "https://huggingface.co/bartowski/Phi-3.5-mini-instruct-GGUF",
        command: "huggingface-cli download bartowski/Phi-3.5-mini-instruct-GGUF --include \"*Q4_K_M.gguf\" --local-dir ./models/phi-3.5-mini",
        mandatory: false,
        loaded_by_default: true,
    },
    ModelDescriptor {
        id: "qwen-2.5-3b",
        name: "Qwen 2.5 3B Instruct",
        family: "Qwen",
        size: "3B",
        quantization: "Q4_K_M GGUF",
        price_label: "€12 / month",
        description: "Efficient multilingual SLM with good reasoning-to-size ratio for production prototypes.",
        why_use: "Best for multilingual: excellent in French and other languages, ideal for international prototypes.",
        best_for: "Pick it when your documents or your team span several languages.",
        strengths: &["Very good in French", "Solid multilingual", "Good size/reasoning trade-off"],
        download_url: "https://huggingface.co/bartowski/Qwen2.5-3B-Instruct-GGUF",
        command: "huggingface-cli download bartowski/Qwen2.5-3B-Instruct-GGUF --include \"*Q4_K_M.gguf\" --local-dir ./models/qwen-2.5-3b",
        mandatory: false,
        loaded_by_default: true,
    },
    ModelDescriptor {
        id: "mistral-7b-instruct",
        name: "Mistral 7B Instruct v0.3",
        family: "Mistral",
        size: "7B",
        quantization: "Q4_K_M GGUF",
        price_label: "€19 / month",
        description: "High-quality local model for deeper context windows when your machine can handle heavier inference.",
        why_use: "For experts: more powerful, better context understanding, ideal for complex documents.",
        best_for: "Pick it for long technical PDFs and complex questions that need more context.",
        strengths: &["Advanced comprehension", "Better on complex cases", "Richer context"],
        download_url: "https://huggingface.co/bartowski/Mistral-7B-Instruct-v0.3-GGUF",
        command: "huggingface-cli download bartowski/Mistral-7B-Instruct-v0.3-GGUF --include \"*Q4_K_M.gguf\" --local-dir ./models/mistral-7b",
        mandatory: false,
        loaded_by_default: false,
    },
    ModelDescriptor {
        id: "gemma-2-2b",
        name: "Gemma 2 2B Instruct",
        family: "Gemma",
        size: "2B",
        quantization: "Q4_K_M GGUF",
        price_label: "€7 / month",
        description: "Lightweight assistant model focused on fast responses for daily internal workflows.",
        why_use: "Lightest and fastest: perfect for daily tasks, instant responses, low resource usage.",
        best_for: "Pick it for ultra-fast daily use on a light machine.",
        strengths: &["Very fast", "Ultra light", "Great for repetitive tasks"],
        download_url: "https://huggingface.co/bartowski/gemma-2-2b-it-GGUF",
        command: "huggingface-cli download bartowski/gemma-2-2b-it-GGUF --include \"*Q4_K_M.gguf\" --local-dir ./models/gemma-2-2b",
        mandatory: false,
        loaded_by_default: false,
    },
];

pub fn catalog() -> &'static [ModelDescriptor] {
    &CATALOG
}

pub fn find_model(model_id: &str) -> Option<&'static ModelDescriptor> {
    CATALOG.iter().find(|entry| entry.id == model_id)
}

/// Retrieval depth per catalog model. Models without an entry use `DEFAULT_TOP_K`.
pub fn top_k_for(model_id: Option<&str>) -> u32 {
    match model_id {
        Some("llama-3.2-3b") => 5,
        Some("phi-3.5-mini") => 4,
        Some("qwen-2.5-3b") => 5,
        Some("mistral-7b-instruct") => 7,
        Some("gemma-2-2b") => 4,
        _ => DEFAULT_TOP_K,
    }
}

/// The one shape used for "the selected model" everywhere in the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub id: Option<String>,
    pub name: String,
}

impl ModelRef {
    pub fn unknown() -> Self {
        Self {
            id: None,
            name: UNKNOWN_MODEL_NAME.to_string(),
        }
    }

    pub fn from_name(raw: &str) -> Self {
        let name = raw.trim();
        if name.is_empty() {
            return Self::unknown();
        }
        Self {
            id: None,
            name: name.to_string(),
        }
    }

    pub fn from_local(local: &LocalModel) -> Self {
        match match_local_model(local) {
            Some(entry) => Self::from(entry),
            None => {
                let id = Some(local.key.trim().to_string()).filter(|key| !key.is_empty());
                let name = if local.file_name.trim().is_empty() {
                    local.key.as_str()
                } else {
                    local.file_name.as_str()
                };
                Self {
                    id,
                    ..Self::from_name(name)
                }
            }
        }
    }

    pub fn id_or_empty(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    pub fn top_k(&self) -> u32 {
        top_k_for(self.id.as_deref())
    }
}

impl From<&ModelDescriptor> for ModelRef {
    fn from(entry: &ModelDescriptor) -> Self {
        Self {
            id: Some(entry.id.to_string()),
            name: entry.name.to_string(),
        }
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub fn normalize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

pub fn match_local_model(local: &LocalModel) -> Option<&'static ModelDescriptor> {
    let key = normalize_identifier(&local.key);
    let path = normalize_identifier(&local.path);
    CATALOG.iter().find(|entry| {
        let id = normalize_identifier(entry.id);
        path.contains(&id) || key.contains(&id)
    })
}

pub fn format_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "Unknown size".to_string();
    }
    let gib = size_bytes as f64 / (1024.0 * 1024.0 * 1024.0);
    if gib >= 1.0 {
        return format!("{gib:.2} GB");
    }
    let mib = size_bytes as f64 / (1024.0 * 1024.0);
    format!("{mib:.1} MB")
}
