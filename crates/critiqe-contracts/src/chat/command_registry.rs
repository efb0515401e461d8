#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: &'static str,
}

/// Commands whose whole remainder is free text.
pub(crate) const RAW_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "prompt",
        action: "set_prompt",
    },
    CommandSpec {
        command: "tweak",
        action: "set_tweak",
    },
    CommandSpec {
        command: "topic",
        action: "set_topic",
    },
    CommandSpec {
        command: "refine",
        action: "refine",
    },
];

/// Commands taking a single catalog id.
pub(crate) const ID_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "style",
        action: "select_style",
    },
    CommandSpec {
        command: "toggle",
        action: "toggle_modifier",
    },
    CommandSpec {
        command: "platform",
        action: "select_platform",
    },
    CommandSpec {
        command: "mood",
        action: "select_mood",
    },
];

pub(crate) const SINGLE_PATH_COMMANDS: &[CommandSpec] = &[CommandSpec {
    command: "save",
    action: "save",
}];

pub(crate) const MULTI_PATH_COMMANDS: &[CommandSpec] = &[CommandSpec {
    command: "upload",
    action: "upload",
}];

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "enhance",
        action: "set_enhance_auto",
    },
    CommandSpec {
        command: "draft",
        action: "draft",
    },
    CommandSpec {
        command: "generate",
        action: "generate",
    },
    CommandSpec {
        command: "original",
        action: "show_original",
    },
    CommandSpec {
        command: "result",
        action: "show_result",
    },
    CommandSpec {
        command: "status",
        action: "status",
    },
    CommandSpec {
        command: "catalog",
        action: "catalog",
    },
    CommandSpec {
        command: "help",
        action: "help",
    },
];

pub const CHAT_HELP_COMMANDS: &[&str] = &[
    "/upload",
    "/style",
    "/toggle",
    "/prompt",
    "/enhance",
    "/tweak",
    "/topic",
    "/platform",
    "/mood",
    "/draft",
    "/generate",
    "/refine",
    "/original",
    "/result",
    "/save",
    "/status",
    "/catalog",
    "/help",
];
