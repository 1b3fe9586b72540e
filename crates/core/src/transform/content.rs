//! Whole-file rewriting of SDK-internal examples into standalone ones.

use regex_lite::{NoExpand, Regex};
use tracing::trace;

use super::rules::TransformRules;
use crate::errors::TransformError;

/// One step of the transform pipeline, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransformStep {
    SrcImport,
    InlineComment,
    BlockComment,
    ClonedRepoComment,
    PackageComment,
    OrCommentBlock,
    BlankLines,
}

impl TransformStep {
    pub const ALL: [TransformStep; 7] = [
        Self::SrcImport,
        Self::InlineComment,
        Self::BlockComment,
        Self::ClonedRepoComment,
        Self::PackageComment,
        Self::OrCommentBlock,
        Self::BlankLines,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::SrcImport => "src-import",
            Self::InlineComment => "inline-comment",
            Self::BlockComment => "block-comment",
            Self::ClonedRepoComment => "cloned-repo-comment",
            Self::PackageComment => "package-comment",
            Self::OrCommentBlock => "or-comment-block",
            Self::BlankLines => "blank-lines",
        }
    }
}

impl std::fmt::Display for TransformStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Match counts per step for one transformed file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
    counts: Vec<(TransformStep, usize)>,
}

impl TransformReport {
    fn record(&mut self, step: TransformStep, matches: usize) {
        self.counts.push((step, matches));
    }

    /// Matches for `step`, or `None` when the step does not apply to this
    /// exchange.
    pub fn matches(&self, step: TransformStep) -> Option<usize> {
        self.counts
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, n)| *n)
    }

    /// Steps that applied, with their match counts.
    pub fn steps(&self) -> impl Iterator<Item = (TransformStep, usize)> + '_ {
        self.counts.iter().copied()
    }

    pub fn changed(&self) -> bool {
        self.counts.iter().any(|(_, n)| *n > 0)
    }
}

/// Applies one exchange's rules to file contents.
#[derive(Debug, Clone)]
pub struct Transformer {
    rules: TransformRules,
    import_replacement: String,
}

impl Transformer {
    pub fn new(exchange: &str, package_name: &str) -> Result<Self, TransformError> {
        Ok(Self::from_rules(TransformRules::resolve(exchange, package_name)?))
    }

    pub fn from_rules(rules: TransformRules) -> Self {
        let import_replacement = format!("from '{}'", rules.package_name());
        Self {
            rules,
            import_replacement,
        }
    }

    pub fn rules(&self) -> &TransformRules {
        &self.rules
    }

    pub fn transform(&self, content: &str) -> String {
        self.transform_with_report(content).0
    }

    /// Rewrite `content` and report how often each step matched.
    ///
    /// Steps run in a fixed order over the whole text; a step that matches
    /// nothing leaves the text untouched.
    pub fn transform_with_report(&self, content: &str) -> (String, TransformReport) {
        let rules = &self.rules;
        let mut report = TransformReport::default();

        let mut text = apply(
            &rules.src_import,
            content,
            &self.import_replacement,
            TransformStep::SrcImport,
            &mut report,
        );
        text = apply(
            &rules.inline_comment,
            &text,
            "",
            TransformStep::InlineComment,
            &mut report,
        );
        if let Some(re) = &rules.block_comment {
            text = apply(re, &text, "\n\n", TransformStep::BlockComment, &mut report);
        }
        if let Some((block, line)) = &rules.cloned_repo_comment {
            let before = count(block, &text) + count(line, &text);
            text = block.replace_all(&text, NoExpand("\n")).into_owned();
            text = line.replace_all(&text, NoExpand("")).into_owned();
            report.record(TransformStep::ClonedRepoComment, before);
        }
        text = apply(
            &rules.package_comment,
            &text,
            "\n\n",
            TransformStep::PackageComment,
            &mut report,
        );
        if let Some(re) = &rules.or_comment_block {
            text = apply(re, &text, "\n\n", TransformStep::OrCommentBlock, &mut report);
        }
        text = apply(
            &rules.blank_lines,
            &text,
            "\n\n",
            TransformStep::BlankLines,
            &mut report,
        );

        (text, report)
    }
}

fn count(re: &Regex, text: &str) -> usize {
    re.find_iter(text).count()
}

fn apply(
    re: &Regex,
    text: &str,
    replacement: &str,
    step: TransformStep,
    report: &mut TransformReport,
) -> String {
    let matches = count(re, text);
    report.record(step, matches);
    if matches == 0 {
        return text.to_string();
    }
    trace!(step = %step, matches, "applying transform step");
    re.replace_all(text, NoExpand(replacement)).into_owned()
}

/// Rewrite one file's text for `exchange`, importing from `package_name`.
pub fn transform_content(
    content: &str,
    package_name: &str,
    exchange: &str,
) -> Result<String, TransformError> {
    Ok(Transformer::new(exchange, package_name)?.transform(content))
}
