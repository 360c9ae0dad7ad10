//! Chooses which publishers run for a build.

use outbound_config::{ParamPublish, PublisherConfig};
use outbound_transfer::BuildContext;
use regex::Regex;
use tracing::debug;

use crate::error::PublishError;

/// Publisher selection for one run.
#[derive(Debug, Clone)]
pub enum PublisherSelector {
    /// Every publisher runs.
    All,
    /// Only publishers whose whole label matches `regex`.
    Matching { regex: Regex, pattern: String },
}

impl PublisherSelector {
    /// Builds the selector from the run's [`ParamPublish`] and the build's
    /// variables.
    ///
    /// A blank parameter name selects everything. Otherwise the variable it
    /// names must be set and hold a valid regex.
    pub fn from_config(
        param: Option<&ParamPublish>,
        ctx: &BuildContext,
    ) -> Result<Self, PublishError> {
        let Some(parameter) = param
            .map(|p| p.parameter_name.trim())
            .filter(|name| !name.is_empty())
        else {
            return Ok(Self::All);
        };

        let pattern = ctx
            .env
            .get(parameter)
            .ok_or_else(|| PublishError::NoParameter(parameter.to_string()))?
            .clone();
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            PublishError::BadPattern {
                parameter: parameter.to_string(),
                pattern: pattern.clone(),
                source,
            }
        })?;
        debug!(parameter, pattern = %pattern, "selecting publishers by label");
        Ok(Self::Matching { regex, pattern })
    }

    /// Returns `true` if `publisher` should run, printing the decision.
    pub fn selected(&self, publisher: &PublisherConfig, ctx: &BuildContext) -> bool {
        let Self::Matching { regex, pattern } = self else {
            return true;
        };
        let label = publisher
            .label
            .as_deref()
            .map(|label| ctx.expand(label).trim().to_string())
            .unwrap_or_default();

        let matched = regex.is_match(&label);
        if matched {
            ctx.println(&format!(
                "Label [{label}] matches expression [{pattern}], publishing to [{}]",
                publisher.config_name
            ));
        } else {
            ctx.println(&format!(
                "Skipping [{}]: label [{label}] does not match expression [{pattern}]",
                publisher.config_name
            ));
        }
        matched
    }
}
