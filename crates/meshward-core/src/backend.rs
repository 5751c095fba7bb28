// ── Management server backend ──
//
// Fetches entity collections through `meshward_api::ApiClient`, converts
// them to model types, and implements `GroupWriter` so the membership
// differ can persist its operations. Holds no cache: every call hits the
// server, and a `Snapshot` is only as fresh as the call that built it.

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use meshward_api::ApiClient;

use crate::config::ClientConfig;
use crate::convert::resource_from_wire;
use crate::error::CoreError;
use crate::membership::{GroupRequest, GroupWriter};
use crate::model::{EntityId, Group, Network, Peer, Policy, PostureCheck, Resource};

/// Handle to one management server.
#[derive(Debug, Clone)]
pub struct Backend {
    client: ApiClient,
}

impl Backend {
    /// Build a token-authenticated client from runtime config.
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let client =
            ApiClient::from_token(config.url.as_str(), &config.token, &config.transport())?;
        Ok(Self { client })
    }

    pub fn from_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn groups(&self) -> Result<Vec<Group>, CoreError> {
        let groups = self.client.list_groups().await?;
        Ok(groups.into_iter().map(Group::from).collect())
    }

    pub async fn peers(&self) -> Result<Vec<Peer>, CoreError> {
        let peers = self.client.list_peers().await?;
        Ok(peers.into_iter().map(Peer::from).collect())
    }

    pub async fn policies(&self) -> Result<Vec<Policy>, CoreError> {
        let policies = self.client.list_policies().await?;
        Ok(policies.into_iter().map(Policy::from).collect())
    }

    pub async fn posture_checks(&self) -> Result<Vec<PostureCheck>, CoreError> {
        let checks = self.client.list_posture_checks().await?;
        Ok(checks.into_iter().map(PostureCheck::from).collect())
    }

    pub async fn networks(&self) -> Result<Vec<Network>, CoreError> {
        let networks = self.client.list_networks().await?;
        Ok(networks.into_iter().map(Network::from).collect())
    }

    pub async fn network_resources(
        &self,
        network_id: &EntityId,
    ) -> Result<Vec<Resource>, CoreError> {
        let resources = self
            .client
            .list_network_resources(network_id.as_str())
            .await?;
        Ok(resources
            .into_iter()
            .map(|r| resource_from_wire(r, network_id))
            .collect())
    }

    /// Resources of every network in `networks`, fetched concurrently.
    ///
    /// A network whose resource list cannot be fetched is skipped with a
    /// warning rather than failing the whole listing.
    pub async fn resources_of(&self, networks: &[Network]) -> Vec<Resource> {
        let futs = networks.iter().map(|network| async move {
            match self.network_resources(&network.id).await {
                Ok(resources) => resources,
                Err(e) => {
                    warn!(network_id = %network.id, error = %e, "network resource fetch failed");
                    Vec::new()
                }
            }
        });
        join_all(futs).await.into_iter().flatten().collect()
    }

    /// Fetch everything the matcher and differ work against.
    ///
    /// Groups, peers and policies are required. Posture checks and networks
    /// are optional: a server without those endpoints yields empty lists.
    pub async fn snapshot(&self) -> Result<Snapshot, CoreError> {
        let (groups_res, peers_res, policies_res, checks_res, networks_res) = tokio::join!(
            self.client.list_groups(),
            self.client.list_peers(),
            self.client.list_policies(),
            self.client.list_posture_checks(),
            self.client.list_networks(),
        );

        let groups: Vec<Group> = groups_res?.into_iter().map(Group::from).collect();
        let peers: Vec<Peer> = peers_res?.into_iter().map(Peer::from).collect();
        let policies: Vec<Policy> = policies_res?.into_iter().map(Policy::from).collect();
        let posture_checks: Vec<PostureCheck> = unwrap_or_empty("posture-checks", checks_res);
        let networks: Vec<Network> = unwrap_or_empty("networks", networks_res);

        let resources = self.resources_of(&networks).await;

        info!(
            groups = groups.len(),
            peers = peers.len(),
            policies = policies.len(),
            networks = networks.len(),
            resources = resources.len(),
            "snapshot fetched"
        );

        Ok(Snapshot {
            groups,
            peers,
            policies,
            posture_checks,
            networks,
            resources,
        })
    }
}

fn unwrap_or_empty<S, D>(endpoint: &str, result: Result<Vec<S>, meshward_api::Error>) -> Vec<D>
where
    D: From<S>,
{
    match result {
        Ok(items) => items.into_iter().map(D::from).collect(),
        Err(ref e) if e.is_not_found() => {
            debug!("{endpoint}: not available (404), treating as empty");
            Vec::new()
        }
        Err(e) if e.is_transient() => {
            warn!("{endpoint}: temporarily unavailable ({e}), treating as empty");
            Vec::new()
        }
        Err(e) => {
            warn!("{endpoint}: unexpected error {e}, treating as empty");
            Vec::new()
        }
    }
}

// ── Writes ───────────────────────────────────────────────────────────

impl GroupWriter for Backend {
    async fn create_group(&self, request: &GroupRequest) -> Result<Group, CoreError> {
        let body = meshward_api::types::GroupRequest::from(request);
        let created = self.client.create_group(&body).await?;
        Ok(Group::from(created))
    }

    async fn update_group(
        &self,
        id: &EntityId,
        request: &GroupRequest,
    ) -> Result<Group, CoreError> {
        let body = meshward_api::types::GroupRequest::from(request);
        let updated = self.client.update_group(id.as_str(), &body).await?;
        Ok(Group::from(updated))
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// Point-in-time copy of the server's entity collections.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub groups: Vec<Group>,
    pub peers: Vec<Peer>,
    pub policies: Vec<Policy>,
    pub posture_checks: Vec<PostureCheck>,
    pub networks: Vec<Network>,
    pub resources: Vec<Resource>,
}

impl Snapshot {
    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Look a peer up by id, then by name.
    pub fn find_peer(&self, query: &str) -> Option<&Peer> {
        self.peers
            .iter()
            .find(|p| p.id.as_str() == query)
            .or_else(|| self.peers.iter().find(|p| p.name == query))
    }

    /// Look a resource up by id, then by name, within one network.
    pub fn find_resource(&self, network_id: &EntityId, query: &str) -> Option<&Resource> {
        let in_network = || {
            self.resources
                .iter()
                .filter(move |r| r.network_id.as_ref() == Some(network_id))
        };
        in_network()
            .find(|r| r.id.as_str() == query)
            .or_else(|| in_network().find(|r| r.name == query))
    }

    /// Look a policy up by id, then by name.
    pub fn find_policy(&self, query: &str) -> Option<&Policy> {
        self.policies
            .iter()
            .find(|p| p.id.as_str() == query)
            .or_else(|| self.policies.iter().find(|p| p.name == query))
    }

    /// Full groups (with members) for a peer's embedded group list.
    ///
    /// Peers and resources carry only group ids and names; membership
    /// edits need the member lists from the group listing.
    pub fn expand_groups(&self, groups: &[Group]) -> Vec<Group> {
        groups
            .iter()
            .map(|g| {
                self.groups
                    .iter()
                    .find(|full| full.same_group(g))
                    .cloned()
                    .unwrap_or_else(|| g.clone())
            })
            .collect()
    }

    /// Existing groups for `names`, with drafts for names not on the server.
    pub fn groups_named<S: AsRef<str>>(&self, names: &[S]) -> Vec<Group> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.group_by_name(name)
                    .cloned()
                    .unwrap_or_else(|| Group::draft(name))
            })
            .collect()
    }
}
