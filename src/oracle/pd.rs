use crate::config::{StoreOptions, StoreOptionsValidated};
use crate::grpc::pdpb::pd_client::PdClient;
use crate::grpc::pdpb::{ErrorType, GetMembersRequest, RequestHeader, ResponseHeader, TsoRequest};
use crate::oracle::{LogicalTime, OracleError, TimestampOracle};
use crate::store::{dial, parse_endpoint, OpContext};
use std::convert::TryFrom;
use tonic::transport::Endpoint;
use tonic::Request;

/// PdTimestampOracle allocates timestamps from PD's TSO service.
///
/// It dials lazily on every call. Control commands are one-shot, and most never need a timestamp.
pub struct PdTimestampOracle {
    logger: slog::Logger,
    endpoints: Vec<(String, Endpoint)>,
    options: StoreOptionsValidated,
}

impl PdTimestampOracle {
    pub fn new(logger: slog::Logger, endpoints: &[String], options: StoreOptions) -> Result<Self, OracleError> {
        let options = StoreOptionsValidated::try_from(options).map_err(|e| OracleError::IllegalOptions(e.to_string()))?;

        let mut parsed = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            parsed.push(parse_endpoint(endpoint).map_err(|_| OracleError::InvalidEndpoint(endpoint.clone()))?);
        }

        Ok(PdTimestampOracle {
            logger,
            endpoints: parsed,
            options,
        })
    }

    async fn allocate(&self) -> Result<LogicalTime, OracleError> {
        let channel = dial(&self.logger, &self.endpoints, &self.options)
            .await
            .map_err(|failures| OracleError::Unreachable { failures })?;
        let mut client = PdClient::new(channel);

        // PD rejects TSO requests that don't carry its cluster ID.
        let members = client
            .get_members(Request::new(GetMembersRequest {
                header: Some(RequestHeader { cluster_id: 0 }),
            }))
            .await
            .map_err(|status| OracleError::Rpc {
                op: "GetMembers",
                status,
            })?
            .into_inner();
        check_header(members.header.as_ref())?;
        let cluster_id = members.header.map(|h| h.cluster_id).unwrap_or_default();

        let request = TsoRequest {
            header: Some(RequestHeader { cluster_id }),
            count: 1,
        };
        let mut responses = client
            .tso(Request::new(futures::stream::iter(vec![request])))
            .await
            .map_err(|status| OracleError::Rpc { op: "Tso", status })?
            .into_inner();

        let response = responses
            .message()
            .await
            .map_err(|status| OracleError::Rpc { op: "Tso", status })?
            .ok_or(OracleError::EmptyResponse)?;
        check_header(response.header.as_ref())?;

        let timestamp = response.timestamp.ok_or(OracleError::EmptyResponse)?;
        let time = LogicalTime::new(timestamp.physical, timestamp.logical);
        slog::debug!(
            self.logger,
            "Allocated timestamp";
            "ts" => time.compose(),
            "physical" => ?time.physical_time()
        );

        Ok(time)
    }
}

#[async_trait::async_trait]
impl TimestampOracle for PdTimestampOracle {
    async fn current_time(&self, ctx: &OpContext) -> Result<LogicalTime, OracleError> {
        ctx.run("current_time", self.allocate()).await
    }
}

fn check_header(header: Option<&ResponseHeader>) -> Result<(), OracleError> {
    match header.and_then(|h| h.error.as_ref()) {
        Some(error) if error.r#type != ErrorType::Ok as i32 => Err(OracleError::Pd(format!(
            "{:?}: {}",
            ErrorType::from_i32(error.r#type).unwrap_or(ErrorType::Unknown),
            error.message
        ))),
        _ => Ok(()),
    }
}
