use std::sync::Arc;

use {
    anyhow::Context as _,
    secrecy::ExposeSecret,
    serenity::{Client, http::Http},
    tracing::{info, warn},
};

use {
    mirror_channels::{ChannelId, RelayEndpoint, UserId},
    mirror_config::{MirrorConfig, PairSide, TOKEN_ENV},
    mirror_relay::{Relay, RelayRoutes},
};

use crate::{handler::RelayHandler, outbound::WebhookEndpoint, platform::DiscordPlatform};

/// Connect to Discord and relay events until the gateway closes or Ctrl-C
/// is pressed.
///
/// The token is verified and every webhook resolved before the gateway
/// connects; any failure there is fatal.
pub async fn run(config: &MirrorConfig) -> anyhow::Result<()> {
    let token = config
        .discord
        .token()
        .with_context(|| format!("no bot token configured; set {TOKEN_ENV}"))?;

    let http = Arc::new(Http::new(token));
    let me = http
        .get_current_user()
        .await
        .context("failed to verify bot token")?;
    info!(bot_id = me.id.get(), bot_name = %me.name, "discord credentials verified");

    let routes = build_routes(&http, config).await?;
    let platform = Arc::new(DiscordPlatform::new(Arc::clone(&http)));
    let relay = Arc::new(Relay::new(
        Arc::clone(&platform) as _,
        routes,
        UserId(me.id.get()),
    ));

    let mut client = Client::builder(token, RelayHandler::intents())
        .event_handler(RelayHandler::new(relay, platform))
        .await
        .context("failed to build discord client")?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested, closing gateway");
                shard_manager.shutdown_all().await;
            },
            Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
        }
    });

    client.start().await.context("discord gateway error")?;
    info!("discord gateway closed");
    Ok(())
}

async fn build_routes(http: &Arc<Http>, config: &MirrorConfig) -> anyhow::Result<RelayRoutes> {
    let mut routes = RelayRoutes::new();
    for pair in &config.pairs {
        let a_out = connect_side(http, &pair.a).await?;
        let b_out = connect_side(http, &pair.b).await?;
        routes.add_pair(
            ChannelId(pair.a.channel_id),
            a_out,
            ChannelId(pair.b.channel_id),
            b_out,
        )?;
        info!(a = pair.a.channel_id, b = pair.b.channel_id, "relay pair registered");
    }
    Ok(routes)
}

async fn connect_side(http: &Arc<Http>, side: &PairSide) -> anyhow::Result<Arc<dyn RelayEndpoint>> {
    let endpoint = WebhookEndpoint::connect(Arc::clone(http), side.webhook_url.expose_secret())
        .await
        .with_context(|| format!("webhook for channel {} is unusable", side.channel_id))?;
    if endpoint.channel_id() == Some(side.channel_id) {
        warn!(
            channel_id = side.channel_id,
            "webhook posts into its own source channel; it should target the paired channel"
        );
    }
    Ok(Arc::new(endpoint))
}
