// crates/wps-execute-core/src/runtime/kvp.rs
// ============================================================================
// Module: Compact Request Decoder
// Description: Lowers key/value execute requests into resolver inputs.
// Purpose: Decode IDENTIFIER, DATAINPUTS, and response form parameters.
// Dependencies: crate::{core, runtime}, tracing, url
// ============================================================================

//! ## Overview
//! Compact requests are flat maps with uppercase keys. `DATAINPUTS` and
//! `RESPONSEDOCUMENT` hold `;`-separated attributed parameter tokens and
//! `RAWDATAOUTPUT` holds a single token. Tokens are typed by the declared
//! input they name, so a literal input reads the token value as text while a
//! bounding box input reads it as `minx,miny,maxx,maxy[,crs]`. Complex inputs
//! can only be passed by reference in this encoding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::core::AttributedParameter;
use crate::core::ExecuteError;
use crate::core::FormatSpec;
use crate::core::Identifier;
use crate::core::InputKind;
use crate::core::ProcessDescriptor;
use crate::core::ResolvedInput;
use crate::runtime::cardinality::count_occurrences;
use crate::runtime::cardinality::validate_cardinality;
use crate::runtime::engine::LoweredRequest;
use crate::runtime::inputs::InputResolver;
use crate::runtime::inputs::RawInput;
use crate::runtime::inputs::RawInputValue;
use crate::runtime::inputs::RawReference;
use crate::runtime::options::EngineOptions;
use crate::runtime::options::RequestLimits;
use crate::runtime::outputs::RawOutput;
use crate::runtime::outputs::RawResponseDocument;
use crate::runtime::outputs::ensure_single_form;

// ============================================================================
// SECTION: Parameter Names
// ============================================================================

/// Process identifier parameter.
pub const KVP_IDENTIFIER: &str = "IDENTIFIER";
/// Language parameter.
pub const KVP_LANGUAGE: &str = "LANGUAGE";
/// Data inputs parameter.
pub const KVP_DATA_INPUTS: &str = "DATAINPUTS";
/// Response document parameter.
pub const KVP_RESPONSE_DOCUMENT: &str = "RESPONSEDOCUMENT";
/// Raw data output parameter.
pub const KVP_RAW_DATA_OUTPUT: &str = "RAWDATAOUTPUT";
/// Store execute response flag.
pub const KVP_STORE_EXECUTE_RESPONSE: &str = "STOREEXECUTERESPONSE";
/// Lineage flag.
pub const KVP_LINEAGE: &str = "LINEAGE";
/// Status flag.
pub const KVP_STATUS: &str = "STATUS";

/// Separator between tokens in list parameters.
const TOKEN_SEPARATOR: char = ';';
/// Separator between bounding box parts.
const BBOX_SEPARATOR: char = ',';
/// Four bounds plus an optional CRS.
const MAX_BBOX_PARTS: usize = 5;

// ============================================================================
// SECTION: KVP Parameters
// ============================================================================

/// Compact request parameters with uppercase keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvpParams {
    /// Parameter values keyed by uppercase name.
    params: BTreeMap<String, String>,
}

impl KvpParams {
    /// Creates an empty parameter map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            params: BTreeMap::new(),
        }
    }

    /// Parses an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored. Values are percent-decoded once.
    #[must_use]
    pub fn parse_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes()).collect()
    }

    /// Sets a parameter, uppercasing its name.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.params.insert(name.as_ref().to_ascii_uppercase(), value.into());
    }

    /// Returns a parameter value by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(&name.to_ascii_uppercase()).map(String::as_str)
    }

    /// Returns true when the parameter is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(&name.to_ascii_uppercase())
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true when no parameters are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for KvpParams
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Lowers a compact request into resolved inputs and raw response constructs.
pub(crate) fn lower_kvp(
    params: &KvpParams,
    options: &EngineOptions,
    lookup: impl FnOnce(&Identifier) -> Result<Arc<ProcessDescriptor>, ExecuteError>,
) -> Result<LoweredRequest, ExecuteError> {
    let Some(identifier) = params.get(KVP_IDENTIFIER) else {
        return Err(ExecuteError::MissingParameter {
            parameter: KVP_IDENTIFIER.to_string(),
        });
    };
    debug!(identifier, "decoding compact execute request");
    let process = lookup(&Identifier::new(identifier))?;
    let language = params.get(KVP_LANGUAGE).map(str::to_string);

    let inputs = match params.get(KVP_DATA_INPUTS) {
        Some(encoded) => decode_data_inputs(encoded, &process, options)?,
        None => Vec::new(),
    };
    validate_cardinality(&count_occurrences(&inputs), &process.inputs)?;

    let document_tokens = params.get(KVP_RESPONSE_DOCUMENT);
    let raw_token = params.get(KVP_RAW_DATA_OUTPUT);
    ensure_single_form(document_tokens.is_some(), raw_token.is_some())?;

    let raw_data = raw_token
        .map(|token| decode_output(token, "RawDataOutput", options))
        .transpose()?
        .map(|mut output| {
            output.as_reference = false;
            output
        });
    let document = if raw_data.is_some() {
        None
    } else {
        decode_response_document(params, document_tokens, options)?
    };

    Ok(LoweredRequest {
        process,
        language,
        inputs,
        document,
        raw_data,
    })
}

/// Decodes and resolves every `DATAINPUTS` token in order.
fn decode_data_inputs(
    encoded: &str,
    process: &ProcessDescriptor,
    options: &EngineOptions,
) -> Result<Vec<ResolvedInput>, ExecuteError> {
    let tokens = split_tokens(encoded);
    RequestLimits::check("data inputs", options.limits.max_data_inputs, tokens.len())?;
    let resolver = InputResolver::new(process, options);
    let mut inputs = Vec::with_capacity(tokens.len());
    for token in tokens {
        let parameter = decode_token(token, "DataInputs", options)?;
        debug!(token = %parameter, "decoded data input");
        let identifier = Identifier::new(parameter.identifier());
        let definition = resolver.definition(&identifier)?;
        let value = match &definition.kind {
            InputKind::Literal(_) => RawInputValue::Literal {
                value: parameter.value().unwrap_or_default().to_string(),
                data_type: parameter.data_type().map(str::to_string),
                uom: parameter.uom().map(str::to_string),
            },
            InputKind::BoundingBox(_) => {
                bounding_box_value(&identifier, parameter.value().unwrap_or_default())?
            }
            InputKind::Complex(_) => RawInputValue::Reference(RawReference {
                href: parameter.href().map(str::to_string),
                format: requested_format(&parameter),
                ..RawReference::default()
            }),
        };
        inputs.push(resolver.resolve(RawInput::new(identifier, value))?);
    }
    Ok(inputs)
}

/// Decodes the response document parameters, if any are present.
fn decode_response_document(
    params: &KvpParams,
    tokens: Option<&str>,
    options: &EngineOptions,
) -> Result<Option<RawResponseDocument>, ExecuteError> {
    let flags_present = [KVP_STORE_EXECUTE_RESPONSE, KVP_LINEAGE, KVP_STATUS]
        .iter()
        .any(|flag| params.contains(flag));
    if tokens.is_none() && !flags_present {
        return Ok(None);
    }
    let outputs = tokens
        .map(|encoded| {
            split_tokens(encoded)
                .into_iter()
                .map(|token| decode_output(token, "ResponseDocument", options))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;
    Ok(Some(RawResponseDocument {
        outputs,
        store_execute_response: parse_flag(params, KVP_STORE_EXECUTE_RESPONSE)?,
        lineage: parse_flag(params, KVP_LINEAGE)?,
        status: parse_flag(params, KVP_STATUS)?,
    }))
}

/// Decodes one output token.
fn decode_output(
    token: &str,
    parameter: &str,
    options: &EngineOptions,
) -> Result<RawOutput, ExecuteError> {
    let decoded = decode_token(token, parameter, options)?;
    Ok(RawOutput {
        identifier: Identifier::new(decoded.identifier()),
        format: requested_format(&decoded),
        uom: decoded.uom().map(str::to_string),
        as_reference: decoded.as_reference().is_some_and(|value| value.eq_ignore_ascii_case("true")),
        title: None,
        summary: None,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Splits a list parameter, dropping trailing empty tokens.
fn split_tokens(encoded: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = encoded.split(TOKEN_SEPARATOR).collect();
    while tokens.len() > 1 && tokens.last().is_some_and(|token| token.is_empty()) {
        tokens.pop();
    }
    tokens
}

/// Decodes one token after enforcing the token size limit.
fn decode_token(
    token: &str,
    parameter: &str,
    options: &EngineOptions,
) -> Result<AttributedParameter, ExecuteError> {
    RequestLimits::check("token bytes", options.limits.max_token_bytes, token.len())?;
    AttributedParameter::decode(token).map_err(|_| ExecuteError::MalformedParameter {
        parameter: parameter.to_string(),
        token: token.to_string(),
    })
}

/// Builds the requested format from token attributes.
fn requested_format(parameter: &AttributedParameter) -> FormatSpec {
    FormatSpec::new(
        parameter.mime_type().map(str::to_string),
        parameter.schema().map(str::to_string),
        parameter.encoding().map(str::to_string),
    )
}

/// Splits `minx,miny,maxx,maxy[,crs]` into coordinates and CRS.
fn bounding_box_value(identifier: &Identifier, value: &str) -> Result<RawInputValue, ExecuteError> {
    let mut coordinates: Vec<String> = value.split(BBOX_SEPARATOR).map(str::to_string).collect();
    if coordinates.len() > MAX_BBOX_PARTS {
        return Err(ExecuteError::InvalidCoordinates {
            identifier: identifier.clone(),
            coordinates: value.to_string(),
        });
    }
    let crs = if coordinates.len() > 4 { Some(coordinates.remove(4)) } else { None };
    Ok(RawInputValue::BoundingBox {
        coordinates,
        crs,
    })
}

/// Parses an optional boolean flag (`true`/`false`, any case).
fn parse_flag(params: &KvpParams, name: &str) -> Result<bool, ExecuteError> {
    match params.get(name) {
        None => Ok(false),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
        Some(value) => Err(ExecuteError::InvalidParameterValue {
            parameter: name.to_string(),
            value: value.to_string(),
        }),
    }
}
