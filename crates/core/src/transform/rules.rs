//! Per-exchange pattern table.
//!
//! Every upstream SDK phrases the "alternative import" comments around its
//! examples a little differently, so each exchange gets its own [`RuleSet`]
//! of pattern sources. `{pkg}` in a source is replaced with the escaped
//! package name before compilation. Unknown exchanges fall back to
//! [`FALLBACK`].

use regex_lite::Regex;
use tracing::debug;

use crate::errors::TransformError;

/// Placeholder substituted with the escaped package name.
const PKG: &str = "{pkg}";

// ---------------------------------------------------------------------------
// Shared pattern sources
// ---------------------------------------------------------------------------

/// `from '../../src'`, `from '../src/index'`.
const IMPORT_PLAIN: &str = r#"from\s+['"](?:\.\./)+src(?:/[^'"]*)?['"]"#;

/// As [`IMPORT_PLAIN`], also tolerating `src//x` and a trailing `.js`.
const IMPORT_JS: &str = r#"from\s+['"](?:\.\./)+src(?://?[^'"]*)?(?:\.js)?['"]"#;

/// As [`IMPORT_JS`], also tolerating a trailing `.ts`.
const IMPORT_JS_OR_TS: &str = r#"from\s+['"](?:\.\./)+src(?://?[^'"]*)?(?:\.(?:js|ts))?['"]"#;

/// `// or` followed by a commented import, or any commented import/const
/// line naming the package.
const PACKAGE_STANDARD: &str = r#"(?:\n\s*//\s*or\s*\n\s*//\s*(?:import|const).*?\n)+|\n\s*//\s*(?://\s*)?(?:import|const).*?['"]{pkg}['"].*?\n"#;

const PACKAGE_OKX: &str = r#"(?:\n\s*//\s*(?:If you cloned|or|or if you're not using typescript|or use the module installed)[^\n]*\n\s*//\s*(?:import|const).*?\n)+|\n\s*//\s*(?://\s*)?(?:import|const|If you cloned|or use the module|or if you're not).*?['"]{pkg}['"].*?\n"#;

/// Kraken names a scoped package, matched without surrounding quotes.
const PACKAGE_KRAKEN: &str = r#"(?:\n\s*//\s*or\s*\n\s*//\s*(?:import|const).*?\n)+|\n\s*//\s*(?://\s*)?(?:import|const|normally you should install).*?{pkg}.*?\n"#;

const PACKAGE_KUCOIN: &str = r#"(?:\n\s*//\s*or\s*\n\s*//\s*(?:import|const).*?\n)+|\n\s*//\s*(?://\s*)?(?:import|const|normally you should install).*?['"]{pkg}['"].*?\n"#;

/// Bitmart sometimes precedes the commented import with an
/// "import from npm" line.
const PACKAGE_BITMART: &str = r#"(?:\n\s*//\s*or\s*\n\s*//\s*(?:import|const).*?\n)+|\n\s*//\s*(?://\s*)?(?:import\s*from\s*npm[^\n]*\n\s*)?//\s*(?:import|const).*?['"]{pkg}['"].*?\n"#;

/// Trailing `// from 'pkg'` comment.
const INLINE_STANDARD: &str = r#"(?m)\s*//\s*from\s*['"]{pkg}['"];?\s*$"#;

const INLINE_KRAKEN: &str = r#"(?m)\s*//\s*(?:from\s*['"]{pkg}['"]|normally you should install[^\n]*{pkg}[^\n]*);?\s*$"#;

const INLINE_KUCOIN: &str = r#"(?m)\s*//\s*(?:from\s*['"]{pkg}['"]|normally you should install[^\n]*{pkg}[^\n]*);?\s*$"#;

const INLINE_GATE: &str = r#"(?m)\s*//\s*(?:For an easy demonstration[^\n]*|Import the[^\n]*from the published version[^\n]*|normally you should install[^\n]*|.*{pkg}[^\n]*)$"#;

/// `/** import ... 'pkg' ... */`.
const BLOCK_QUOTED: &str = r#"\n\s*/\*\*\s*\n\s*\*\s*(?:import|const).*?['"]{pkg}['"][\s\S]*?\*/\s*\n"#;

const BLOCK_KRAKEN: &str = r#"\n\s*/\*\*\s*\n\s*\*\s*(?:import|const).*?{pkg}[\s\S]*?\*/\s*\n"#;

/// `// or, with the npm package` followed by a commented-out import block.
const OR_NPM_BLOCK: &str = r#"\n\s*//\s*or,?\s*with the npm package\s*\n\s*/\*[\s\S]*?from\s*['"]{pkg}['"];?\s*\*/\s*\n"#;

const CLONED_REPO_OKX: &str = r#"\n\s*//\s*If you cloned the repo[^\n]*\n(?:\s*//\s*(?:or use the module|or if you're not using typescript)[^\n]*\n\s*//\s*(?:import|const).*?\n)*"#;

/// Any remaining "If you cloned the repo" line, including one on the first
/// line of a file.
const CLONED_REPO_LINE: &str = r#"(?m)^\s*//\s*If you cloned the repo[^\n]*\n"#;

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// Declarative pattern sources for one exchange's comment conventions.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    pub exchange: &'static str,
    pub src_import: &'static str,
    pub inline_comment: &'static str,
    pub package_comment: &'static str,
    pub block_comment: Option<&'static str>,
    pub or_comment_block: Option<&'static str>,
    pub cloned_repo_comment: Option<&'static str>,
}

/// Rules for exchanges that are not in [`RULE_SETS`].
pub const FALLBACK: RuleSet = RuleSet {
    exchange: "*",
    src_import: IMPORT_PLAIN,
    inline_comment: INLINE_STANDARD,
    package_comment: PACKAGE_STANDARD,
    block_comment: None,
    or_comment_block: None,
    cloned_repo_comment: None,
};

pub const RULE_SETS: &[RuleSet] = &[
    RuleSet {
        exchange: "binance",
        src_import: IMPORT_PLAIN,
        inline_comment: INLINE_STANDARD,
        package_comment: PACKAGE_STANDARD,
        block_comment: None,
        or_comment_block: Some(OR_NPM_BLOCK),
        cloned_repo_comment: None,
    },
    RuleSet {
        exchange: "okx",
        src_import: IMPORT_JS,
        inline_comment: INLINE_STANDARD,
        package_comment: PACKAGE_OKX,
        block_comment: Some(BLOCK_QUOTED),
        or_comment_block: None,
        cloned_repo_comment: Some(CLONED_REPO_OKX),
    },
    RuleSet {
        exchange: "kraken",
        src_import: IMPORT_JS,
        inline_comment: INLINE_KRAKEN,
        package_comment: PACKAGE_KRAKEN,
        block_comment: Some(BLOCK_KRAKEN),
        or_comment_block: None,
        cloned_repo_comment: None,
    },
    RuleSet {
        exchange: "gate",
        src_import: IMPORT_JS,
        inline_comment: INLINE_GATE,
        package_comment: PACKAGE_STANDARD,
        block_comment: None,
        or_comment_block: None,
        cloned_repo_comment: None,
    },
    RuleSet {
        exchange: "kucoin",
        src_import: IMPORT_JS_OR_TS,
        inline_comment: INLINE_KUCOIN,
        package_comment: PACKAGE_KUCOIN,
        block_comment: Some(BLOCK_QUOTED),
        or_comment_block: None,
        cloned_repo_comment: None,
    },
    RuleSet {
        exchange: "bitget",
        src_import: IMPORT_JS,
        inline_comment: INLINE_STANDARD,
        package_comment: PACKAGE_STANDARD,
        block_comment: None,
        or_comment_block: None,
        cloned_repo_comment: None,
    },
    RuleSet {
        exchange: "bitmart",
        src_import: IMPORT_JS,
        inline_comment: INLINE_STANDARD,
        package_comment: PACKAGE_BITMART,
        block_comment: None,
        or_comment_block: None,
        cloned_repo_comment: None,
    },
    RuleSet {
        exchange: "bybit",
        src_import: IMPORT_JS,
        inline_comment: INLINE_STANDARD,
        package_comment: PACKAGE_STANDARD,
        block_comment: None,
        or_comment_block: Some(OR_NPM_BLOCK),
        cloned_repo_comment: None,
    },
    RuleSet {
        exchange: "coinbase",
        src_import: IMPORT_JS,
        inline_comment: INLINE_STANDARD,
        package_comment: PACKAGE_STANDARD,
        block_comment: Some(BLOCK_QUOTED),
        or_comment_block: None,
        cloned_repo_comment: None,
    },
];

impl RuleSet {
    /// The rule set for `exchange` (case-insensitive), or [`FALLBACK`].
    pub fn for_exchange(exchange: &str) -> &'static RuleSet {
        RULE_SETS
            .iter()
            .find(|r| r.exchange.eq_ignore_ascii_case(exchange))
            .unwrap_or(&FALLBACK)
    }
}

// ---------------------------------------------------------------------------
// Compiled rules
// ---------------------------------------------------------------------------

/// A rule set compiled for one package name.
#[derive(Debug, Clone)]
pub struct TransformRules {
    pub(crate) exchange: String,
    pub(crate) package_name: String,
    pub(crate) src_import: Regex,
    pub(crate) inline_comment: Regex,
    pub(crate) block_comment: Option<Regex>,
    pub(crate) cloned_repo_comment: Option<(Regex, Regex)>,
    pub(crate) package_comment: Regex,
    pub(crate) or_comment_block: Option<Regex>,
    pub(crate) blank_lines: Regex,
}

impl TransformRules {
    /// Compile the matchers for `exchange` importing from `package_name`.
    pub fn resolve(exchange: &str, package_name: &str) -> Result<Self, TransformError> {
        let set = RuleSet::for_exchange(exchange);
        let escaped = regex_lite::escape(package_name);
        let compile = |rule: &'static str, source: &str| -> Result<Regex, TransformError> {
            Regex::new(&source.replace(PKG, &escaped)).map_err(|e| {
                TransformError::InvalidPattern {
                    exchange: exchange.to_string(),
                    rule,
                    detail: e.to_string(),
                }
            })
        };

        debug!(
            exchange,
            rule_set = set.exchange,
            package = package_name,
            "resolving transform rules"
        );

        let cloned_repo_comment = match set.cloned_repo_comment {
            Some(source) => Some((
                compile("cloned_repo_comment", source)?,
                compile("cloned_repo_line", CLONED_REPO_LINE)?,
            )),
            None => None,
        };

        Ok(Self {
            exchange: exchange.to_lowercase(),
            package_name: package_name.to_string(),
            src_import: compile("src_import", set.src_import)?,
            inline_comment: compile("inline_comment", set.inline_comment)?,
            block_comment: set
                .block_comment
                .map(|s| compile("block_comment", s))
                .transpose()?,
            cloned_repo_comment,
            package_comment: compile("package_comment", set.package_comment)?,
            or_comment_block: set
                .or_comment_block
                .map(|s| compile("or_comment_block", s))
                .transpose()?,
            blank_lines: compile("blank_lines", r"\n{3,}")?,
        })
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }
}
