//! # 作业参数校验
//!
//! 在执行前检查作业定义 `<parameters>` 段落中声明的每个参数：
//! 配置中已有值则保留，否则写入声明的默认值，两者皆无则记为缺失。
//! 所有缺失参数在一次调用中汇总后统一报告。

use std::fmt;

use coordinator_errors::{CoordError, CoordResult};
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::job_configuration::JobConfiguration;

static WORKFLOW_SCHEMA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^uri:oozie:workflow:(\d+)\.(\d+)$").expect("Invalid schema namespace pattern")
});

/// 一个 `<parameters>/<property>` 声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDeclaration {
    pub name: String,
    pub default_value: Option<String>,
}

/// Workflow schema version taken from the definition's namespace URI
///
/// Major and minor are compared as integers, not as a decimal fraction:
/// `0.10` is newer than `0.4` and therefore falls in the advising range,
/// whereas a floating-point reading would treat it as `0.1` and stay silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// `uri:oozie:workflow:<major>.<minor>`; any other URI has no version
    pub fn from_namespace(uri: &str) -> Option<Self> {
        let captures = WORKFLOW_SCHEMA_REGEX.captures(uri)?;
        let major = captures.get(1)?.as_str().parse().ok()?;
        let minor = captures.get(2)?.as_str().parse().ok()?;
        Some(Self::new(major, minor))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// What to do when a definition has no `<parameters>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParametersPolicy {
    Silent,
    Advise,
}

/// Half-open schema version range `[from, until)`; `until: None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyRange {
    pub from: SchemaVersion,
    pub until: Option<SchemaVersion>,
    pub policy: ParametersPolicy,
}

impl PolicyRange {
    fn contains(&self, version: SchemaVersion) -> bool {
        version >= self.from && self.until.map_or(true, |until| version < until)
    }
}

/// Behaviour for definitions without a `<parameters>` element, by schema version
pub const MISSING_PARAMETERS_POLICY: [PolicyRange; 2] = [
    PolicyRange {
        from: SchemaVersion::new(0, 0),
        until: Some(SchemaVersion::new(0, 4)),
        policy: ParametersPolicy::Silent,
    },
    PolicyRange {
        from: SchemaVersion::new(0, 4),
        until: None,
        policy: ParametersPolicy::Advise,
    },
];

pub fn policy_for(version: SchemaVersion) -> ParametersPolicy {
    MISSING_PARAMETERS_POLICY
        .iter()
        .find(|range| range.contains(version))
        .map(|range| range.policy)
        .unwrap_or(ParametersPolicy::Silent)
}

/// Outcome of a successful verification pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Names that received their declared default, in document order
    pub applied_defaults: Vec<String>,
    /// Set when the definition omits `<parameters>` on a schema expected to declare them
    pub advisory: Option<String>,
}

/// Declared parameters of a definition, or `None` when it has no `<parameters>` element.
///
/// Entries whose trimmed name is missing or empty are dropped.
pub fn parse_declarations(root: Node<'_, '_>) -> Option<Vec<ParameterDeclaration>> {
    let parameters = child_in_namespace(root, root, "parameters")?;

    let declarations = parameters
        .children()
        .filter(|n| is_element_in_namespace(*n, root, "property"))
        .filter_map(|property| {
            let name = child_in_namespace(property, root, "name")
                .map(trimmed_text)
                .filter(|name| !name.is_empty());
            let Some(name) = name else {
                debug!(
                    "跳过没有名称的参数声明 (位置 {})",
                    property.range().start
                );
                return None;
            };
            let default_value = child_in_namespace(property, root, "value").map(trimmed_text);
            Some(ParameterDeclaration {
                name,
                default_value,
            })
        })
        .collect();

    Some(declarations)
}

/// 作业参数校验器
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterVerifier;

impl ParameterVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Resolve every declared parameter against `conf`, inserting defaults for
    /// absent keys. Defaults applied before a failure stay applied.
    #[instrument(skip_all)]
    pub fn verify(
        &self,
        conf: &mut JobConfiguration,
        root: Option<Node<'_, '_>>,
    ) -> CoordResult<VerificationReport> {
        let Some(root) = root else {
            return Ok(VerificationReport::default());
        };

        let Some(declarations) = parse_declarations(root) else {
            return Ok(VerificationReport {
                applied_defaults: Vec::new(),
                advisory: legacy_advisory(root),
            });
        };

        let mut report = VerificationReport::default();
        let mut missing = Vec::new();
        for declaration in declarations {
            if conf.contains(&declaration.name) {
                continue;
            }
            match declaration.default_value {
                Some(value) => {
                    conf.set(declaration.name.clone(), value);
                    report.applied_defaults.push(declaration.name);
                }
                None => missing.push(declaration.name),
            }
        }

        if !missing.is_empty() {
            return Err(CoordError::missing_parameters(missing));
        }

        debug!("参数校验通过，应用默认值 {} 个", report.applied_defaults.len());
        Ok(report)
    }
}

/// Parse a definition document and verify it against `conf`
pub fn verify_definition_xml(
    conf: &mut JobConfiguration,
    xml: &str,
) -> CoordResult<VerificationReport> {
    let document = parse_definition(xml)?;
    ParameterVerifier::new().verify(conf, Some(document.root_element()))
}

/// Parse a definition document once so callers can both list and verify its parameters
pub fn parse_definition(xml: &str) -> CoordResult<Document<'_>> {
    Document::parse(xml)
        .map_err(|e| CoordError::definition_parse(format!("作业定义XML解析失败: {e}")))
}

fn legacy_advisory(root: Node<'_, '_>) -> Option<String> {
    let namespace = root.tag_name().namespace()?;
    let version = SchemaVersion::from_namespace(namespace)?;

    match policy_for(version) {
        ParametersPolicy::Silent => None,
        ParametersPolicy::Advise => {
            let advisory = format!(
                "作业定义 (schema {version}) 未声明 <parameters> 段落，0.4 及以上版本的定义应声明作业参数"
            );
            warn!(schema = %version, "{}", advisory);
            Some(advisory)
        }
    }
}

fn is_element_in_namespace(node: Node<'_, '_>, scope: Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == scope.tag_name().namespace()
}

fn child_in_namespace<'a, 'input>(
    node: Node<'a, 'input>,
    scope: Node<'_, '_>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| is_element_in_namespace(*child, scope, name))
}

/// Direct text content only, trimmed
fn trimmed_text(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect::<String>()
        .trim()
        .to_string()
}
