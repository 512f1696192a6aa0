use regex_lite::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::OnceLock;

pub const SYSTEM_PROMPT: &str =
    "You are a professional dance instructor specializing in freestyle dance.";

/// Builds the user message the relay sends for a prompt label.
pub fn advice_instruction(prompt: &str) -> String {
    format!(
        "Give me specific advice for practicing \"{}\" in freestyle dance. Keep it under 100 words.",
        prompt
    )
}

#[derive(Debug, Serialize)]
pub struct Link {
    pub title: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Prompt {
    pub label: &'static str,
    pub tips: &'static [&'static str],
    pub links: &'static [Link],
}

pub const PROMPTS: &[Prompt] = &[
    Prompt {
        label: "Bounce",
        tips: &[
            "Keep knees soft; think elastic ankles.",
            "Let head/shoulders ride the bounce.",
            "Lock to the downbeat for 8 counts.",
        ],
        links: &[Link {
            title: "Bounce groove basics",
            url: "https://youtu.be/pm7p_0jVXmw",
        }],
    },
    Prompt {
        label: "Waves",
        tips: &[
            "Wrist → elbow → shoulder → chest.",
            "Lead with fingertips; imagine water.",
            "Practice both directions with breath.",
        ],
        links: &[Link {
            title: "Arm waves tutorial",
            url: "https://youtu.be/8dM1nH3O4Uc",
        }],
    },
    Prompt {
        label: "Groove",
        tips: &[
            "Pick one base groove and keep it.",
            "Layer arms/footwork without losing base.",
            "Close eyes for 4 counts to feel timing.",
        ],
        links: &[Link {
            title: "Find your groove",
            url: "https://youtu.be/2i2kz8uR2aE",
        }],
    },
    Prompt {
        label: "Isolations",
        tips: &[
            "Move one body part while keeping others still.",
            "Start with head, chest, or hips.",
            "Use mirror to check clean movement.",
        ],
        links: &[Link {
            title: "Body isolation basics",
            url: "https://www.youtube.com/watch?v=Xgsk7yvSiPg",
        }],
    },
    Prompt {
        label: "Levels",
        tips: &[
            "Explore high, mid, and low positions.",
            "Transition smoothly between levels.",
            "Challenge: spend 16 counts at each level.",
        ],
        links: &[Link {
            title: "Level changes tutorial",
            url: "https://youtu.be/example2",
        }],
    },
    Prompt {
        label: "Textures",
        tips: &[
            "Mix sharp hits with smooth flows.",
            "Contrast robotic and liquid movements.",
            "Match texture to music dynamics.",
        ],
        links: &[Link {
            title: "Movement quality guide",
            url: "https://youtu.be/example3",
        }],
    },
    Prompt {
        label: "Footwork",
        tips: &[
            "Start simple: step-touch, kick-step.",
            "Keep weight on balls of feet.",
            "Add rhythm variations to basic steps.",
        ],
        links: &[Link {
            title: "Footwork fundamentals",
            url: "https://youtu.be/example4",
        }],
    },
    Prompt {
        label: "Musicality",
        tips: &[
            "Hit accents and breaks in the music.",
            "Dance to different instruments/layers.",
            "Pause when the music pauses.",
        ],
        links: &[Link {
            title: "Music interpretation",
            url: "https://youtu.be/example5",
        }],
    },
    Prompt {
        label: "Floor Work",
        tips: &[
            "Practice getting down and up smoothly.",
            "Use hands for support and transitions.",
            "Explore spins and rolls on the ground.",
        ],
        links: &[Link {
            title: "Floor work basics",
            url: "https://youtu.be/example6",
        }],
    },
    Prompt {
        label: "Freestyle",
        tips: &[
            "Don't overthink, just move.",
            "Trust your body's instincts.",
            "Embrace mistakes as new moves.",
        ],
        links: &[Link {
            title: "Freestyle confidence",
            url: "https://youtu.be/example7",
        }],
    },
];

/// Read-only view over the prompt list. Never mutated after startup.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    prompts: &'static [Prompt],
}

impl Catalog {
    pub fn builtin() -> Self {
        Self { prompts: PROMPTS }
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'static Prompt> {
        self.prompts.get(index)
    }

    pub fn prompts(&self) -> &'static [Prompt] {
        self.prompts
    }

    /// Checks the data-quality expectations: at least one prompt, unique
    /// labels, every prompt carries tips.
    pub fn validate(&self) -> Result<(), String> {
        if self.prompts.is_empty() {
            return Err("catalog has no prompts".to_string());
        }
        let mut seen = HashSet::new();
        for prompt in self.prompts {
            if !seen.insert(prompt.label) {
                return Err(format!("duplicate prompt label '{}'", prompt.label));
            }
            if prompt.tips.is_empty() {
                return Err(format!("prompt '{}' has no tips", prompt.label));
            }
        }
        Ok(())
    }
}

static YOUTUBE_URL: OnceLock<Option<Regex>> = OnceLock::new();

/// Extracts an 11-character YouTube video id from the common URL shapes.
pub fn youtube_id(url: &str) -> Option<String> {
    let re = YOUTUBE_URL
        .get_or_init(|| {
            Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*").ok()
        })
        .as_ref()?;
    let caps = re.captures(url)?;
    let id = caps.get(2)?.as_str();
    if id.chars().count() == 11 {
        Some(id.to_string())
    } else {
        None
    }
}

pub fn embed_url(url: &str) -> Option<String> {
    youtube_id(url).map(|id| format!("https://www.youtube.com/embed/{}", id))
}
