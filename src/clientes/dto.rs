use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Customer fields as sent by API clients or read from a CSV row.
///
/// Everything is optional at this level so that missing fields surface as
/// validation errors with a reason instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ClienteInput {
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// `YYYY-MM-DD` or `DD/MM/YYYY`.
    #[serde(default)]
    #[schema(example = "2015-04-21")]
    pub nascimento: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    #[schema(example = "529.982.247-25")]
    pub cpf: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    /// Filters by name or email.
    pub busca: Option<String>,
}

fn default_limit() -> i64 {
    20
}
