#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub usage: &'static str,
}

pub(crate) const SINGLE_PATH_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "model",
        usage: "/model <path>",
    },
    CommandSpec {
        command: "product",
        usage: "/product <path>",
    },
];

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "gallery",
        usage: "/gallery",
    },
    CommandSpec {
        command: "key",
        usage: "/key",
    },
    CommandSpec {
        command: "help",
        usage: "/help",
    },
    CommandSpec {
        command: "quit",
        usage: "/quit",
    },
    CommandSpec {
        command: "exit",
        usage: "/exit",
    },
];

pub(crate) fn is_registered(command: &str, specs: &[CommandSpec]) -> bool {
    specs.iter().any(|spec| spec.command == command)
}

pub const STUDIO_HELP_COMMANDS: &[&str] = &[
    "/model <path>",
    "/product <path>",
    "/clear model|product|gallery",
    "/presets [category]",
    "/use <preset-id>",
    "/style <scene description>",
    "/gallery",
    "/remove <slot|id>",
    "/export [dir]",
    "/key",
    "/help",
    "/quit",
];
