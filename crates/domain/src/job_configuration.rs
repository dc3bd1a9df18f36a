//! 作业配置
//!
//! 调用方持有的键值映射。键不存在与值为空字符串是两种不同状态。

use std::collections::BTreeMap;

use coordinator_errors::{CoordError, CoordResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobConfiguration {
    entries: BTreeMap<String, String>,
}

impl JobConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Load a Hadoop-style `<configuration><property><name/><value/></property></configuration>`
    /// document. Properties lacking a name or a value are skipped; later
    /// properties override earlier ones with the same name.
    pub fn from_xml(xml: &str) -> CoordResult<Self> {
        let document = roxmltree::Document::parse(xml)
            .map_err(|e| CoordError::definition_parse(format!("作业配置XML解析失败: {e}")))?;

        let root = document.root_element();
        if root.tag_name().name() != "configuration" {
            return Err(CoordError::definition_parse(format!(
                "作业配置根元素应为 configuration，实际为 {}",
                root.tag_name().name()
            )));
        }

        let mut conf = Self::new();
        for property in root
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "property")
        {
            let name = child_text(property, "name");
            let value = child_text(property, "value");
            match (name, value) {
                (Some(name), Some(value)) if !name.is_empty() => conf.set(name, value),
                _ => debug!("跳过不完整的配置属性 (行 {})", property_line(&document, property)),
            }
        }

        Ok(conf)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for JobConfiguration {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut conf = Self::new();
        for (key, value) in iter {
            conf.set(key, value);
        }
        conf
    }
}

fn child_text(node: roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
        .map(|c| c.text().unwrap_or_default().trim().to_string())
}

fn property_line(document: &roxmltree::Document<'_>, node: roxmltree::Node<'_, '_>) -> u32 {
    document.text_pos_at(node.range().start).row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_distinct_from_empty() {
        let mut conf = JobConfiguration::new();
        assert_eq!(conf.get("queue"), None);

        conf.set("queue", "");
        assert!(conf.contains("queue"));
        assert_eq!(conf.get("queue"), Some(""));
    }

    #[test]
    fn test_from_iterator() {
        let conf: JobConfiguration = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        assert_eq!(conf.len(), 2);
        assert_eq!(conf.get("a"), Some("3"));
    }

    #[test]
    fn test_from_xml() {
        let xml = r#"
            <configuration>
                <property>
                    <name> nameNode </name>
                    <value>hdfs://localhost:8020</value>
                </property>
                <property>
                    <name>queueName</name>
                    <value/>
                </property>
                <property>
                    <name>noValue</name>
                </property>
                <property>
                    <value>orphan</value>
                </property>
            </configuration>
        "#;

        let conf = JobConfiguration::from_xml(xml).unwrap();
        assert_eq!(conf.len(), 2);
        assert_eq!(conf.get("nameNode"), Some("hdfs://localhost:8020"));
        assert_eq!(conf.get("queueName"), Some(""));
        assert!(!conf.contains("noValue"));
    }

    #[test]
    fn test_from_xml_rejects_malformed_documents() {
        assert!(matches!(
            JobConfiguration::from_xml("<configuration><property>"),
            Err(CoordError::DefinitionParse(_))
        ));
        assert!(matches!(
            JobConfiguration::from_xml("<workflow-app/>"),
            Err(CoordError::DefinitionParse(_))
        ));
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let conf: JobConfiguration = [("user.name", "oozie")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&conf).unwrap(),
            r#"{"user.name":"oozie"}"#
        );
    }
}
