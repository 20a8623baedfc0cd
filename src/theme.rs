#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    #[default]
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Dark => "Dark",
            ThemeMode::Light => "Light",
        }
    }
}

pub fn theme_css(mode: ThemeMode) -> &'static str {
    match mode {
        ThemeMode::Dark => DARK_THEME,
        ThemeMode::Light => LIGHT_THEME,
    }
}

const DARK_THEME: &str = r#"
:root {
    --color-bg-primary: #0f0a1a;
    --color-bg-secondary: #1a1030;
    --color-bg-overlay: rgba(15, 10, 26, 0.92);
    --color-text-primary: #f8fafc;
    --color-text-muted: #c4b5fd;
    --color-border: #7c3aed;
    --color-surface-muted: #221640;
    --color-input-border: #3b2a63;
    --color-input-bg: #0f0a1a;
    --color-chat-user-bg: #7c3aed;
    --color-chat-user-text: #ffffff;
    --color-chat-agent-bg: #1a1030;
    --color-chat-agent-text: #f8fafc;
    --color-code-bg: #2b303b;
    --color-timestamp: #9b8fbf;
    --color-shimmer-base: rgba(168, 85, 247, 0.25);
    --color-shimmer-highlight: #a855f7;
}
"#;

const LIGHT_THEME: &str = r#"
:root {
    --color-bg-primary: #ffffff;
    --color-bg-secondary: #f5f3ff;
    --color-bg-overlay: rgba(255, 255, 255, 0.98);
    --color-text-primary: #1e1b2e;
    --color-text-muted: #5b5474;
    --color-border: #7c3aed;
    --color-surface-muted: #ede9fe;
    --color-input-border: #d4cdee;
    --color-input-bg: #ffffff;
    --color-chat-user-bg: #7c3aed;
    --color-chat-user-text: #ffffff;
    --color-chat-agent-bg: #f5f3ff;
    --color-chat-agent-text: #1e1b2e;
    --color-code-bg: #2b303b;
    --color-timestamp: #6b6385;
    --color-shimmer-base: rgba(124, 58, 237, 0.25);
    --color-shimmer-highlight: #7c3aed;
}
"#;

/// Layout shared by both palettes.
pub const BASE_CSS: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: var(--color-bg-primary); color: var(--color-text-primary); }
.app { height: 100vh; display: flex; flex-direction: column; }
.header { display: flex; align-items: center; justify-content: space-between; gap: 1rem; padding: 1rem 1.5rem;
    background: linear-gradient(135deg, #581c87 0%, #7c3aed 100%); color: #f8fafc; }
.header-title { font-weight: 700; font-size: 1.1rem; }
.header-subtitle { font-size: 0.8rem; opacity: 0.9; color: #e9d5ff; }
.header-controls { display: flex; gap: 0.5rem; align-items: center; flex-wrap: wrap; }
.header select { background: rgba(255, 255, 255, 0.1); color: #f8fafc; border: 1px solid rgba(255, 255, 255, 0.4); border-radius: 6px; padding: 0.3rem; }
.header select option { color: #1e1b2e; }
.btn { border: 1px solid var(--color-border); background: transparent; color: inherit; border-radius: 6px; padding: 0.4rem 0.8rem; cursor: pointer; }
.btn:disabled { opacity: 0.5; cursor: default; }
.btn:hover:not(:disabled) { background: var(--color-surface-muted); }
.btn-primary { background: var(--color-border); color: #ffffff; }
.btn-header { border-color: rgba(255, 255, 255, 0.4); color: #f8fafc; }
.main-container { flex: 1; display: flex; flex-direction: column; min-height: 0; }
.chat-list { flex: 1; overflow-y: auto; padding: 1.5rem; display: flex; flex-direction: column; gap: 1rem; }
.message-row { display: flex; gap: 0.5rem; }
.message-row.user { justify-content: flex-end; }
.message-stack { max-width: 75%; display: flex; flex-direction: column; gap: 0.25rem; }
.avatar { width: 2rem; height: 2rem; border-radius: 50%; display: flex; align-items: center; justify-content: center;
    background: linear-gradient(135deg, #8b5cf6 0%, #a855f7 100%); color: #fff; font-weight: 700; }
.bubble { padding: 0.75rem 1rem; border-radius: 12px; overflow-wrap: anywhere; }
.bubble.user { background: var(--color-chat-user-bg); color: var(--color-chat-user-text); white-space: pre-wrap; }
.bubble.agent { background: var(--color-chat-agent-bg); color: var(--color-chat-agent-text); }
.bubble.error { border: 1px solid #dc2626; }
.bubble-controls { display: flex; justify-content: flex-end; }
.action-btn { border: none; background: transparent; color: var(--color-text-muted); cursor: pointer; font-size: 0.75rem; }
.message-meta { font-size: 0.7rem; color: var(--color-timestamp); }
.message-meta.align-end { text-align: right; }
.shimmer-text { background: linear-gradient(90deg, var(--color-shimmer-base), var(--color-shimmer-highlight), var(--color-shimmer-base));
    background-size: 200% 100%; -webkit-background-clip: text; color: transparent; animation: shimmer 1.5s infinite; }
@keyframes shimmer { from { background-position: 200% 0; } to { background-position: -200% 0; } }
.md pre { background: var(--color-code-bg); color: #c0c5ce; padding: 0.75rem; border-radius: 8px; overflow-x: auto; }
.md .inline-code { background: var(--color-surface-muted); padding: 0.1rem 0.3rem; border-radius: 4px; font-size: 0.9em; }
.md blockquote { border-left: 3px solid var(--color-border); margin: 0; padding-left: 0.75rem; color: var(--color-text-muted); }
.md .table-scroll { overflow-x: auto; }
.md table { border-collapse: collapse; }
.md th, .md td { border: 1px solid var(--color-input-border); padding: 0.3rem 0.6rem; }
.md a { color: var(--color-border); }
.composer { padding: 1rem 1.5rem; border-top: 1px solid var(--color-input-border); background: var(--color-bg-overlay); }
.composer-inner { display: flex; gap: 0.5rem; align-items: flex-end; }
.composer textarea { flex: 1; resize: none; padding: 0.6rem; border-radius: 8px; font: inherit;
    background: var(--color-input-bg); color: var(--color-text-primary); border: 1px solid var(--color-input-border); }
.composer textarea:focus { outline: none; border-color: var(--color-border); }
.centered-panel { flex: 1; display: flex; align-items: center; justify-content: center; }
.login-form { display: flex; flex-direction: column; gap: 0.75rem; width: 20rem; padding: 2rem; border-radius: 12px; background: var(--color-bg-secondary); }
.login-form input { padding: 0.5rem; border-radius: 6px; border: 1px solid var(--color-input-border); background: var(--color-input-bg); color: var(--color-text-primary); }
.form-error { color: #dc2626; font-size: 0.85rem; }
.text-muted { color: var(--color-text-muted); }
"#;
