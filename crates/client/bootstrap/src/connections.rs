//! Follow-graph views backed by the profile cache.
use std::collections::HashSet;
use std::sync::Arc;

use client_blockchain_core::{IdentityDirectory, Profile, SocialAddress};
use social_runtime::{Result, StateHandle, StateSink};

/// Profiles on either side of an actor's follow graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connections {
    pub following: Vec<Profile>,
    pub followers: Vec<Profile>,
    /// Followers the actor does not follow back
    pub not_following: Vec<Profile>,
}

/// Followers that are not in `following`, in follower order.
pub fn not_following(
    following: &[SocialAddress],
    followers: &[SocialAddress],
) -> Vec<SocialAddress> {
    let following: HashSet<&SocialAddress> = following.iter().collect();
    followers
        .iter()
        .filter(|address| !following.contains(address))
        .cloned()
        .collect()
}

pub struct ConnectionsService {
    directory: Arc<dyn IdentityDirectory>,
    state: StateHandle,
}

impl ConnectionsService {
    pub fn new(directory: Arc<dyn IdentityDirectory>, state: StateHandle) -> Self {
        Self { directory, state }
    }

    /// Profile of `address`, from the cache or else the directory.
    ///
    /// A directory hit is upserted into the cache.
    pub async fn connection_profile(&self, address: &SocialAddress) -> Result<Profile> {
        if let Some(profile) = self.state.profile(address).await? {
            return Ok(profile);
        }

        let profile = self.directory.profile(address).await?;
        tracing::debug!("Cached profile for {}", address);
        self.state.upsert_profile(profile.clone()).await?;
        Ok(profile)
    }

    async fn profiles(&self, addresses: &[SocialAddress]) -> Result<Vec<Profile>> {
        let mut profiles = Vec::with_capacity(addresses.len());
        for address in addresses {
            profiles.push(self.connection_profile(address).await?);
        }
        Ok(profiles)
    }

    pub async fn connections(&self, address: &SocialAddress) -> Result<Connections> {
        let graph = self.directory.graph(address).await?;
        let not_following = not_following(&graph.following, &graph.followers);

        Ok(Connections {
            following: self.profiles(&graph.following).await?,
            followers: self.profiles(&graph.followers).await?,
            not_following: self.profiles(&not_following).await?,
        })
    }

    /// Number of posts (not replies) by `address` currently in the feed.
    pub async fn post_count(&self, address: &SocialAddress) -> Result<usize> {
        Ok(self.state.query_state().await?.post_count(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::{Graph, LocalChain, ProfileFields};
    use client_storage::{MemoryContentStore, Url};
    use social_runtime::{KeyringSigner, SocialClient};

    fn addresses(list: &[&str]) -> Vec<SocialAddress> {
        list.iter().map(|a| SocialAddress::from(*a)).collect()
    }

    #[test]
    fn not_following_is_followers_minus_following() {
        let following = addresses(&["B", "C"]);
        let followers = addresses(&["C", "D"]);
        assert_eq!(not_following(&following, &followers), addresses(&["D"]));
        assert!(not_following(&followers, &followers).is_empty());
        assert_eq!(not_following(&[], &followers), followers);
    }

    fn client(chain: &LocalChain) -> SocialClient {
        SocialClient::builder()
            .storage(MemoryContentStore::new(
                Url::parse("http://uploads.local").unwrap(),
            ))
            .chain(chain.clone())
            .signer(Arc::new(KeyringSigner::new()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn directory_profiles_are_cached() {
        let chain = LocalChain::new();
        for (address, name) in [("A", "Ann"), ("B", "Bob"), ("C", "Cat"), ("D", "Dan")] {
            chain.register_profile(Profile::new(
                SocialAddress::from(address),
                ProfileFields::named(name),
            ));
        }
        chain.register_graph(Graph {
            social_address: SocialAddress::from("A"),
            following: addresses(&["B", "C"]),
            followers: addresses(&["C", "D"]),
        });

        let client = client(&chain);
        let service = ConnectionsService::new(client.directory(), client.handle());

        let connections = service.connections(&SocialAddress::from("A")).await.unwrap();
        let names = |profiles: &[Profile]| -> Vec<String> {
            profiles
                .iter()
                .filter_map(|p| p.name().map(str::to_string))
                .collect()
        };
        assert_eq!(names(&connections.following), vec!["Bob", "Cat"]);
        assert_eq!(names(&connections.followers), vec!["Cat", "Dan"]);
        assert_eq!(names(&connections.not_following), vec!["Dan"]);

        let cached = client.query_state().await.unwrap().profiles;
        assert_eq!(cached.len(), 3);
        assert_eq!(service.post_count(&SocialAddress::from("A")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cached_profile_wins_over_directory() {
        let chain = LocalChain::new();
        let address = SocialAddress::from("B");
        chain.register_profile(Profile::new(address.clone(), ProfileFields::named("Old")));

        let client = client(&chain);
        client
            .handle()
            .upsert_profile(Profile::new(address.clone(), ProfileFields::named("New")))
            .await
            .unwrap();

        let service = ConnectionsService::new(client.directory(), client.handle());
        let profile = service.connection_profile(&address).await.unwrap();
        assert_eq!(profile.name(), Some("New"));
    }

    #[tokio::test]
    async fn unknown_address_is_an_error() {
        let chain = LocalChain::new();
        let client = client(&chain);
        let service = ConnectionsService::new(client.directory(), client.handle());
        assert!(
            service
                .connection_profile(&SocialAddress::from("nobody"))
                .await
                .is_err()
        );
    }
}
