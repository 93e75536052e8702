// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use orgmigrate_identity::{CreatedOrganization, IdentityApiError, NewOrganization, OrganizationApi};

/// Fake organization endpoint that answers from a script of HTTP statuses
/// and records every request it receives.
///
/// A 2xx status creates the organization; any other status is returned as
/// an API error. Once the script runs out every call succeeds.
#[derive(Default)]
pub struct ScriptedApi {
    statuses: Mutex<VecDeque<u16>>,
    requests: Mutex<Vec<NewOrganization>>,
}

impl ScriptedApi {
    pub fn new(statuses: impl IntoIterator<Item = u16>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<NewOrganization> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl OrganizationApi for ScriptedApi {
    async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<CreatedOrganization, IdentityApiError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(organization.clone());
            requests.len()
        };
        let status = self.statuses.lock().unwrap().pop_front().unwrap_or(200);

        if (200..300).contains(&status) {
            Ok(CreatedOrganization {
                id: Some(format!("org_{call}")),
                name: Some(organization.name.clone()),
                slug: None,
            })
        } else {
            Err(IdentityApiError::Api {
                status,
                body: format!(r#"{{"errors":[{{"code":"status_{status}"}}]}}"#),
            })
        }
    }
}

/// Read every entry of a failure log.
pub fn read_log(path: &Path) -> Vec<Value> {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::Deserializer::from_str(&text)
        .into_iter::<Value>()
        .map(Result::unwrap)
        .collect()
}
