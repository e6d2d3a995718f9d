// Security rulebase endpoints
//
// `<vsys>/rulebase/security/rules/entry[@name=..]`. Rule order on the
// device is evaluation order; `set` appends new rules at the bottom.

use tracing::debug;

use crate::error::Error;
use crate::xmlapi::client::XmlApiClient;
use crate::xmlapi::models::SecurityRuleEntry;
use crate::xmlapi::xpath;

impl XmlApiClient {
    /// List every security rule in evaluation order.
    pub async fn list_security_rules(&self) -> Result<Vec<SecurityRuleEntry>, Error> {
        debug!(vsys = self.vsys(), "listing security rules");
        self.list_entries(&xpath::security_rules(self.vsys())).await
    }

    pub async fn security_rule_exists(&self, name: &str) -> Result<bool, Error> {
        self.entry_exists(&xpath::security_rules(self.vsys()), name)
            .await
    }

    pub async fn create_security_rule(&self, entry: &SecurityRuleEntry) -> Result<(), Error> {
        debug!(name = %entry.name, "creating security rule");
        self.set_entry(&xpath::security_rules(self.vsys()), entry)
            .await
    }

    pub async fn edit_security_rule(&self, entry: &SecurityRuleEntry) -> Result<(), Error> {
        debug!(name = %entry.name, "editing security rule");
        self.edit_entry(&xpath::security_rules(self.vsys()), entry)
            .await
    }

    pub async fn delete_security_rule(&self, name: &str) -> Result<(), Error> {
        debug!(name, "deleting security rule");
        self.delete_entry(&xpath::security_rules(self.vsys()), name)
            .await
    }
}
