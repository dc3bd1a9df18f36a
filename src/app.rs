use anyhow::{Context, Result};
use coordinator_core::AppConfig;
use coordinator_domain::{
    parse_declarations, parse_definition, ActionSubsetQuery, CoordinatorActionView,
    JobConfiguration, ParameterDeclaration, ParameterVerifier, VerificationReport,
};
use coordinator_errors::CoordResult;
use coordinator_infrastructure::DatabaseManager;
use serde::Serialize;
use tracing::info;

/// `verify-params` 命令输出
#[derive(Debug, Serialize)]
pub struct VerifyParamsOutput {
    pub declared: Vec<ParameterDeclaration>,
    #[serde(flatten)]
    pub report: VerificationReport,
    /// 校验并补齐默认值之后的作业配置
    pub configuration: JobConfiguration,
}

/// `actions` 命令输出
#[derive(Debug, Serialize)]
pub struct ActionsOutput {
    pub job_id: String,
    pub start: u32,
    pub len: u32,
    pub total: i64,
    pub actions: Vec<CoordinatorActionView>,
}

/// Parse a `-D key=value` override
pub fn parse_define(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("参数覆盖格式应为 key=value: {raw}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("参数名不能为空: {raw}"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Build the job configuration from an optional configuration document plus
/// `-D` overrides, then verify it against the definition's declared parameters.
pub fn verify_params(
    definition_xml: &str,
    conf_xml: Option<&str>,
    defines: &[(String, String)],
) -> CoordResult<VerifyParamsOutput> {
    let mut configuration = match conf_xml {
        Some(xml) => JobConfiguration::from_xml(xml)?,
        None => JobConfiguration::new(),
    };
    for (key, value) in defines {
        configuration.set(key.clone(), value.clone());
    }

    let document = parse_definition(definition_xml)?;
    let root = document.root_element();
    let declared = parse_declarations(root).unwrap_or_default();

    let report = ParameterVerifier::new().verify(&mut configuration, Some(root))?;

    Ok(VerifyParamsOutput {
        declared,
        report,
        configuration,
    })
}

/// 协调器动作查询应用
pub struct Application {
    config: AppConfig,
    database: DatabaseManager,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let database = DatabaseManager::new(&config.database)
            .await
            .context("创建数据库连接池失败")?;
        database.migrate().await.context("数据库迁移失败")?;
        info!("应用初始化完成，数据库类型: {:?}", database.database_type());
        Ok(Self { config, database })
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.database
    }

    /// One page of the job's actions; `len` falls back to and is capped by the query config
    pub async fn list_actions(
        &self,
        job_id: &str,
        statuses: &[String],
        start: u32,
        len: Option<u32>,
    ) -> CoordResult<ActionsOutput> {
        let len = self.config.query.effective_len(len);
        let query = ActionSubsetQuery::new(self.database.action_repository());

        let actions = query.fetch(job_id, statuses, start, len).await?;
        let total = query.count(job_id, statuses).await?;

        Ok(ActionsOutput {
            job_id: job_id.to_string(),
            start,
            len,
            total,
            actions,
        })
    }

    pub async fn shutdown(&self) {
        self.database.close().await;
        info!("数据库连接已关闭");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITION: &str = r#"
        <workflow-app xmlns="uri:oozie:workflow:0.5" name="daily-etl">
            <parameters>
                <property><name>inputDir</name></property>
                <property><name>queueName</name><value>default</value></property>
            </parameters>
            <start to="end"/>
            <end name="end"/>
        </workflow-app>
    "#;

    #[test]
    fn test_parse_define() {
        assert_eq!(
            parse_define("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert_eq!(parse_define("empty=").unwrap().1, "");
        assert!(parse_define("novalue").is_err());
        assert!(parse_define(" =x").is_err());
    }

    #[test]
    fn test_verify_params_with_overrides() {
        let defines = vec![("inputDir".to_string(), "/data/in".to_string())];
        let output = verify_params(DEFINITION, None, &defines).unwrap();

        assert_eq!(output.declared.len(), 2);
        assert_eq!(output.report.applied_defaults, vec!["queueName"]);
        assert_eq!(output.configuration.get("queueName"), Some("default"));
        assert_eq!(output.configuration.get("inputDir"), Some("/data/in"));

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["configuration"]["queueName"], "default");
        assert!(json["advisory"].is_null());
    }

    #[test]
    fn test_verify_params_reads_configuration_document() {
        let conf = r#"<configuration>
                <property><name>inputDir</name><value>/from/conf</value></property>
                <property><name>queueName</name><value>etl</value></property>
            </configuration>"#;
        let defines = vec![("inputDir".to_string(), "/from/cli".to_string())];

        let output = verify_params(DEFINITION, Some(conf), &defines).unwrap();
        assert_eq!(output.configuration.get("inputDir"), Some("/from/cli"));
        assert_eq!(output.configuration.get("queueName"), Some("etl"));
        assert!(output.report.applied_defaults.is_empty());
    }

    #[test]
    fn test_verify_params_reports_missing() {
        let err = verify_params(DEFINITION, None, &[]).unwrap_err();
        assert_eq!(err.error_code(), Some("E0738"));
    }

    #[test]
    fn test_verify_params_rejects_malformed_definition() {
        let err = verify_params("<workflow-app>", None, &[]).unwrap_err();
        assert!(matches!(err, coordinator_errors::CoordError::DefinitionParse(_)));
    }
}
