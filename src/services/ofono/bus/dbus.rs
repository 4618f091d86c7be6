use std::collections::HashMap;

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, warn};
use zbus::{
    Connection, MatchRule, Message, MessageStream,
    message::Type as MessageType,
    proxy::{CacheProperties, Defaults},
    zvariant::{ObjectPath, OwnedObjectPath, OwnedValue},
};

use crate::{
    config::{BusKind, OfonoConfig},
    services::ofono::{
        Interface,
        proxy::{
            HandsfreeProxy, ManagerProxy, NetworkOperatorProxy, NetworkRegistrationProxy,
            VoiceCallManagerProxy, VoiceCallProxy,
        },
        wire::WireEnum,
    },
};

use super::{Action, Listing, ObjectList, PropertyMap, Reply, Signal, SignalStream, Transport};

#[cfg(test)]
mod tests;

type RawObjectList = Vec<(OwnedObjectPath, HashMap<String, OwnedValue>)>;

/// [`Transport`] backed by a zbus connection to the oFono daemon.
#[derive(Debug, Clone)]
pub struct DbusTransport {
    connection: Connection,
    service: String,
}

impl DbusTransport {
    /// Open the bus selected in `config`.
    ///
    /// # Errors
    /// Returns the zbus error if the connection cannot be established.
    pub async fn connect(config: &OfonoConfig) -> zbus::Result<Self> {
        let connection = match config.bus {
            BusKind::System => Connection::system().await?,
            BusKind::Session => Connection::session().await?,
        };

        Ok(Self::new(connection, config.service.clone()))
    }

    /// Use an existing connection.
    pub fn new(connection: Connection, service: String) -> Self {
        Self {
            connection,
            service,
        }
    }

    async fn typed<'a, P>(&'a self, path: &'a str) -> zbus::Result<P>
    where
        P: From<zbus::Proxy<'a>> + Defaults,
    {
        zbus::proxy::Builder::<P>::new(&self.connection)
            .destination(self.service.as_str())?
            .path(path)?
            .cache_properties(CacheProperties::No)
            .build()
            .await
    }

    async fn generic<'a>(
        &'a self,
        path: &'a str,
        interface: Interface,
    ) -> zbus::Result<zbus::Proxy<'a>> {
        zbus::Proxy::new(
            &self.connection,
            self.service.as_str(),
            path,
            interface.as_str(),
        )
        .await
    }
}

#[async_trait]
impl Transport for DbusTransport {
    async fn get_properties(&self, path: &str, interface: Interface) -> zbus::Result<PropertyMap> {
        self.generic(path, interface)
            .await?
            .call("GetProperties", &())
            .await
    }

    async fn set_property(
        &self,
        path: &str,
        interface: Interface,
        name: &str,
        value: OwnedValue,
    ) -> zbus::Result<()> {
        self.generic(path, interface)
            .await?
            .call("SetProperty", &(name, value))
            .await
    }

    async fn list_objects(&self, path: &str, listing: Listing) -> zbus::Result<ObjectList> {
        let objects: RawObjectList = match listing {
            Listing::Modems => self.typed::<ManagerProxy<'_>>(path).await?.get_modems().await?,
            Listing::Calls => {
                self.typed::<VoiceCallManagerProxy<'_>>(path)
                    .await?
                    .get_calls()
                    .await?
            }
            Listing::Operators => {
                self.typed::<NetworkRegistrationProxy<'_>>(path)
                    .await?
                    .get_operators()
                    .await?
            }
            Listing::Scan => {
                self.typed::<NetworkRegistrationProxy<'_>>(path)
                    .await?
                    .scan()
                    .await?
            }
        };

        Ok(objects
            .into_iter()
            .map(|(path, properties)| (path.to_string(), properties))
            .collect())
    }

    async fn invoke(&self, path: &str, action: Action) -> zbus::Result<Reply> {
        let reply = match action {
            Action::Dial {
                number,
                hide_caller_id,
            } => Reply::Path(
                self.typed::<VoiceCallManagerProxy<'_>>(path)
                    .await?
                    .dial(&number, hide_caller_id.as_wire())
                    .await?
                    .to_string(),
            ),
            Action::DialLast => Reply::Path(
                self.typed::<VoiceCallManagerProxy<'_>>(path)
                    .await?
                    .dial_last()
                    .await?
                    .to_string(),
            ),
            Action::Transfer => {
                let proxy = self.typed::<VoiceCallManagerProxy<'_>>(path).await?;
                proxy.transfer().await?;
                Reply::Empty
            }
            Action::SwapCalls => {
                let proxy = self.typed::<VoiceCallManagerProxy<'_>>(path).await?;
                proxy.swap_calls().await?;
                Reply::Empty
            }
            Action::ReleaseAndAnswer => {
                let proxy = self.typed::<VoiceCallManagerProxy<'_>>(path).await?;
                proxy.release_and_answer().await?;
                Reply::Empty
            }
            Action::ReleaseAndSwap => {
                let proxy = self.typed::<VoiceCallManagerProxy<'_>>(path).await?;
                proxy.release_and_swap().await?;
                Reply::Empty
            }
            Action::HoldAndAnswer => {
                let proxy = self.typed::<VoiceCallManagerProxy<'_>>(path).await?;
                proxy.hold_and_answer().await?;
                Reply::Empty
            }
            Action::HangupAll => {
                let proxy = self.typed::<VoiceCallManagerProxy<'_>>(path).await?;
                proxy.hangup_all().await?;
                Reply::Empty
            }
            Action::PrivateChat { call } => {
                let call = ObjectPath::try_from(call.as_str())?;
                let remaining = self
                    .typed::<VoiceCallManagerProxy<'_>>(path)
                    .await?
                    .private_chat(&call)
                    .await?;
                Reply::Paths(remaining.iter().map(ToString::to_string).collect())
            }
            Action::CreateMultiparty => {
                let members = self
                    .typed::<VoiceCallManagerProxy<'_>>(path)
                    .await?
                    .create_multiparty()
                    .await?;
                Reply::Paths(members.iter().map(ToString::to_string).collect())
            }
            Action::HangupMultiparty => {
                let proxy = self.typed::<VoiceCallManagerProxy<'_>>(path).await?;
                proxy.hangup_multiparty().await?;
                Reply::Empty
            }
            Action::SendTones { tones } => {
                let proxy = self.typed::<VoiceCallManagerProxy<'_>>(path).await?;
                proxy.send_tones(&tones).await?;
                Reply::Empty
            }
            Action::Answer => {
                let proxy = self.typed::<VoiceCallProxy<'_>>(path).await?;
                proxy.answer().await?;
                Reply::Empty
            }
            Action::Hangup => {
                let proxy = self.typed::<VoiceCallProxy<'_>>(path).await?;
                proxy.hangup().await?;
                Reply::Empty
            }
            Action::Deflect { number } => {
                let proxy = self.typed::<VoiceCallProxy<'_>>(path).await?;
                proxy.deflect(&number).await?;
                Reply::Empty
            }
            Action::Register => {
                let proxy = self.typed::<NetworkRegistrationProxy<'_>>(path).await?;
                proxy.register().await?;
                Reply::Empty
            }
            Action::RegisterOperator => {
                let proxy = self.typed::<NetworkOperatorProxy<'_>>(path).await?;
                proxy.register().await?;
                Reply::Empty
            }
            Action::RequestPhoneNumber => Reply::Text(
                self.typed::<HandsfreeProxy<'_>>(path)
                    .await?
                    .request_phone_number()
                    .await?,
            ),
        };

        Ok(reply)
    }

    async fn subscribe(&self, path: &str, interface: Interface) -> zbus::Result<SignalStream> {
        let rule = MatchRule::builder()
            .msg_type(MessageType::Signal)
            .path(path)?
            .interface(interface.as_str())?
            .build();

        let mut messages = MessageStream::for_match_rule(rule, &self.connection, None).await?;
        let path = path.to_string();

        let signals = stream! {
            while let Some(message) = messages.next().await {
                let message = match message {
                    Ok(message) => message,
                    Err(err) => {
                        warn!(%path, %interface, error = %err, "dropping unreadable signal");
                        continue;
                    }
                };

                match parse_signal(&message) {
                    Ok(signal) => yield signal,
                    Err(err) => {
                        warn!(%path, %interface, error = %err, "dropping malformed signal");
                    }
                }
            }

            debug!(%path, %interface, "signal stream ended");
        };

        Ok(signals.boxed())
    }
}

fn parse_signal(message: &Message) -> zbus::Result<Signal> {
    let header = message.header();
    let member = header
        .member()
        .map(|member| member.as_str().to_string())
        .unwrap_or_default();
    let body = message.body();

    let signal = match member.as_str() {
        "PropertyChanged" => {
            let (name, value): (String, OwnedValue) = body.deserialize()?;
            Signal::PropertyChanged { name, value }
        }
        "ModemAdded" => {
            let (path, properties): (OwnedObjectPath, PropertyMap) = body.deserialize()?;
            Signal::ModemAdded {
                path: path.to_string(),
                properties,
            }
        }
        "ModemRemoved" => {
            let path: OwnedObjectPath = body.deserialize()?;
            Signal::ModemRemoved {
                path: path.to_string(),
            }
        }
        "CallAdded" => {
            let (path, properties): (OwnedObjectPath, PropertyMap) = body.deserialize()?;
            Signal::CallAdded {
                path: path.to_string(),
                properties,
            }
        }
        "CallRemoved" => {
            let path: OwnedObjectPath = body.deserialize()?;
            Signal::CallRemoved {
                path: path.to_string(),
            }
        }
        "DisconnectReason" => Signal::DisconnectReason(body.deserialize()?),
        "BarringActive" => Signal::BarringActive(body.deserialize()?),
        "Forwarded" => Signal::Forwarded(body.deserialize()?),
        _ => Signal::Other { member },
    };

    Ok(signal)
}
