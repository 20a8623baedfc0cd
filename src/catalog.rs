//! Models and personalities offered to the user. The agent runtime decides
//! what each of them means; the client only forwards the ids.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PersonalityOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const MODEL_OPTIONS: &[ModelOption] = &[
    ModelOption {
        id: "us.amazon.nova-micro-v1:0",
        name: "Amazon Nova Micro",
        description: "Fast and efficient for simple tasks",
    },
    ModelOption {
        id: "us.amazon.nova-pro-v1:0",
        name: "Amazon Nova Pro",
        description: "Balanced performance and capability",
    },
    ModelOption {
        id: "us.amazon.nova-premier-v1:0",
        name: "Amazon Nova Premier",
        description: "Most capable Nova model",
    },
    ModelOption {
        id: "us.anthropic.claude-sonnet-4-20250514-v1:0",
        name: "Claude Sonnet 4",
        description: "Advanced reasoning and analysis",
    },
];

pub const PERSONALITY_OPTIONS: &[PersonalityOption] = &[
    PersonalityOption {
        id: "basic",
        name: "Helpful Assistant",
        description: "Balanced and professional",
    },
    PersonalityOption {
        id: "creative",
        name: "Creative Thinker",
        description: "Imaginative and innovative",
    },
    PersonalityOption {
        id: "analytical",
        name: "Analytical Expert",
        description: "Logical and detailed responses",
    },
    PersonalityOption {
        id: "friendly",
        name: "Friendly Companion",
        description: "Warm and conversational",
    },
    PersonalityOption {
        id: "silly",
        name: "Silly Trickster",
        description: "Tells jokes and gives silly responses",
    },
];

pub const DEFAULT_MODEL: &str = "us.amazon.nova-micro-v1:0";
pub const DEFAULT_PERSONALITY: &str = "basic";

pub fn find_model(id: &str) -> Option<&'static ModelOption> {
    MODEL_OPTIONS.iter().find(|option| option.id == id)
}

pub fn find_personality(id: &str) -> Option<&'static PersonalityOption> {
    PERSONALITY_OPTIONS.iter().find(|option| option.id == id)
}
