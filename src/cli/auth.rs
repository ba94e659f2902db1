use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    spotify, tidal,
    types::{PkceToken, Service},
};

pub async fn auth(service: Service) {
    match service {
        Service::Spotify => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            spotify::auth::auth(oauth_result).await;
        }
        Service::Tidal => tidal::auth::auth().await,
    }
}
