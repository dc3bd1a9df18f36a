//! # SQLx 数据库类型转换实现
//!
//! 本模块仅在启用 `sqlx-support` feature 时编译
//! 协调器动作状态在两种数据库中都以大写文本存储

use crate::entities::CoordinatorActionStatus;

impl sqlx::Type<sqlx::Postgres> for CoordinatorActionStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    // TEXT 与 VARCHAR 列都可以解码
    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl sqlx::Type<sqlx::Sqlite> for CoordinatorActionStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <str as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CoordinatorActionStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse()
            .map_err(|_| format!("Invalid coordinator action status: {s}").into())
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for CoordinatorActionStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        s.parse()
            .map_err(|_| format!("Invalid coordinator action status: {s}").into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for CoordinatorActionStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for CoordinatorActionStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}
