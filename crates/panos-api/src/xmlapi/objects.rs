// Address object endpoints
//
// `<vsys>/address/entry[@name=..]`: ip-netmask, ip-range or fqdn values.

use tracing::debug;

use crate::error::Error;
use crate::xmlapi::client::XmlApiClient;
use crate::xmlapi::models::AddressEntry;
use crate::xmlapi::xpath;

impl XmlApiClient {
    /// List every address object in the vsys, in device order.
    pub async fn list_addresses(&self) -> Result<Vec<AddressEntry>, Error> {
        debug!(vsys = self.vsys(), "listing address objects");
        self.list_entries(&xpath::addresses(self.vsys())).await
    }

    /// Whether an address object called `name` exists.
    pub async fn address_exists(&self, name: &str) -> Result<bool, Error> {
        self.entry_exists(&xpath::addresses(self.vsys()), name).await
    }

    /// Create an address object (`action=set`).
    ///
    /// `set` merges into an existing entry of the same name; callers
    /// check [`address_exists`](Self::address_exists) first.
    pub async fn create_address(&self, entry: &AddressEntry) -> Result<(), Error> {
        debug!(name = %entry.name, "creating address object");
        self.set_entry(&xpath::addresses(self.vsys()), entry).await
    }

    /// Replace an existing address object with `entry` (`action=edit`).
    /// Unmodelled children carried on `entry` are written back as-is.
    pub async fn edit_address(&self, entry: &AddressEntry) -> Result<(), Error> {
        debug!(name = %entry.name, "editing address object");
        self.edit_entry(&xpath::addresses(self.vsys()), entry).await
    }

    /// Delete an address object by name.
    pub async fn delete_address(&self, name: &str) -> Result<(), Error> {
        debug!(name, "deleting address object");
        self.delete_entry(&xpath::addresses(self.vsys()), name).await
    }
}
