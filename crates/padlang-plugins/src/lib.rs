//! The standard padlang plugin.
//!
//! Functions read the pull request snapshot, its changed files and the
//! register map. Actions write back to the pull request through the host.

mod actions;
mod functions;

use anyhow::Result;
use once_cell::sync::Lazy;
use padlang_eval::{BuiltIns, PluginSource, Type};

static STANDARD: Lazy<PluginSource> = Lazy::new(|| {
    let strings = || Type::array_of(Type::String);

    PluginSource::new()
        .function("author", vec![], Type::String, functions::author)
        .function("title", vec![], Type::String, functions::title)
        .function("description", vec![], Type::String, functions::description)
        .function("isDraft", vec![], Type::Bool, functions::is_draft)
        .function("labels", vec![], strings(), functions::labels)
        .function("reviewers", vec![], strings(), functions::reviewers)
        .function("fileCount", vec![], Type::Int, functions::file_count)
        .function(
            "totalCreatedPullRequests",
            vec![Type::String],
            Type::Int,
            functions::total_created_pull_requests,
        )
        .function("hasFileExtensions", vec![strings()], Type::Bool, functions::has_file_extensions)
        .function("hasFilePattern", vec![Type::String], Type::Bool, functions::has_file_pattern)
        .function("group", vec![Type::String], strings(), functions::group)
        .function("rule", vec![Type::String], Type::Bool, functions::rule)
        .function("isElementOf", vec![Type::String, strings()], Type::Bool, functions::is_element_of)
        .action("addLabel", vec![Type::String], actions::add_label)
        .action("removeLabel", vec![Type::String], actions::remove_label)
        .action("comment", vec![Type::String], actions::comment)
        .action("assignReviewer", vec![strings()], actions::assign_reviewer)
});

/// The standard functions and actions, unvalidated.
pub fn plugin_source() -> PluginSource {
    STANDARD.clone()
}

/// The standard plugin as a ready registry.
pub fn plugin_builtins() -> Result<BuiltIns> {
    BuiltIns::assemble([plugin_source()])
}
