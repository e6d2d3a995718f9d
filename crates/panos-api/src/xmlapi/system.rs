// Operational command endpoints
//
// `type=op` requests: free-form diagnostics such as `show system info`.

use tracing::debug;

use crate::error::Error;
use crate::xmlapi::client::XmlApiClient;
use crate::xmlapi::op::cli_to_xml;

impl XmlApiClient {
    /// Run an operational command and return the raw XML response.
    ///
    /// `command` is either CLI text (`show system info`) or an XML
    /// command document (`<show><system><info/></system></show>`).
    pub async fn op(&self, command: &str) -> Result<String, Error> {
        let cmd = cli_to_xml(command);
        debug!(cmd, "running operational command");
        self.request(&[("type", "op"), ("cmd", &cmd)]).await
    }

    /// `show system info`, used to verify reachability and the API key.
    pub async fn system_info(&self) -> Result<String, Error> {
        self.op("<show><system><info/></system></show>").await
    }
}
