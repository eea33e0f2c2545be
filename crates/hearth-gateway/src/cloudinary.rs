//! Cloudinary upload API client.
//!
//! Requests are signed: every parameter except the file and the API key is
//! sorted, joined as `k=v&k=v`, suffixed with the API secret and hashed
//! with SHA-256.

use crate::image::{ImageHost, UploadFile, UploadedImage};
use crate::signature::sha256_hex;
use crate::GatewayError;
use async_trait::async_trait;
use hearth_data::{ClientRequestBuilder, FetchClient, FilePart, MultipartForm};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

const SERVICE: &str = "cloudinary";

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder new uploads are placed in.
    pub folder: Option<String>,
    pub api_base: String,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl CloudinaryConfig {
    fn is_configured(&self) -> bool {
        !(self.cloud_name.is_empty() || self.api_key.is_empty() || self.api_secret.is_empty())
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Sign a parameter set.
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let joined = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    sha256_hex(format!("{joined}{api_secret}").as_bytes())
}

#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    config: CloudinaryConfig,
    http: FetchClient,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig, timeout: Duration) -> Result<Self, GatewayError> {
        let http = FetchClient::with_timeout(timeout)
            .map_err(GatewayError::fetch(SERVICE))?
            .with_base_url(config.api_base.clone());
        Ok(Self { config, http })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("/v1_1/{}/image/{}", self.config.cloud_name, action)
    }

    /// Signature, api key and the signed params ready to send.
    fn signed(&self, mut params: BTreeMap<&'static str, String>) -> Vec<(String, String)> {
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());
        let signature = sign_params(&params, &self.config.api_secret);
        let mut fields: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        fields.push(("api_key".into(), self.config.api_key.clone()));
        fields.push(("signature".into(), signature));
        fields.push(("signature_algorithm".into(), "sha256".into()));
        fields
    }

    fn upload_request(&self, file: UploadFile) -> Result<ClientRequestBuilder, GatewayError> {
        if !self.config.is_configured() {
            return Err(GatewayError::NotConfigured("Image host"));
        }
        file.validate()?;
        let mut params = BTreeMap::new();
        if let Some(folder) = &self.config.folder {
            params.insert("folder", folder.clone());
        }
        let form = self
            .signed(params)
            .into_iter()
            .fold(MultipartForm::new(), |form, (k, v)| form.text(k, v))
            .file(FilePart {
                field: "file".into(),
                filename: file.filename,
                content_type: Some(file.content_type),
                bytes: file.bytes,
            });
        Ok(self.http.post(self.endpoint("upload")).multipart(form))
    }

    fn destroy_request(&self, public_id: &str) -> Result<ClientRequestBuilder, GatewayError> {
        if !self.config.is_configured() {
            return Err(GatewayError::NotConfigured("Image host"));
        }
        if public_id.trim().is_empty() {
            return Err(GatewayError::InvalidInput("public_id is required".into()));
        }
        let params = BTreeMap::from([("public_id", public_id.to_string())]);
        Ok(self
            .http
            .post(self.endpoint("destroy"))
            .form(self.signed(params)))
    }
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    async fn upload(&self, file: UploadFile) -> Result<UploadedImage, GatewayError> {
        let filename = file.filename.clone();
        let uploaded: UploadResponse = self
            .upload_request(file)?
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(GatewayError::fetch(SERVICE))?
            .json()
            .map_err(GatewayError::invalid_response(SERVICE))?;
        tracing::info!(public_id = %uploaded.public_id, %filename, "image uploaded");
        Ok(UploadedImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            width: uploaded.width,
            height: uploaded.height,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), GatewayError> {
        let response: DestroyResponse = self
            .destroy_request(public_id)?
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(GatewayError::fetch(SERVICE))?
            .json()
            .map_err(GatewayError::invalid_response(SERVICE))?;
        match response.result.as_str() {
            "ok" => {
                tracing::info!(%public_id, "image destroyed");
                Ok(())
            }
            "not found" => Err(GatewayError::NotFound(format!("Image {public_id}"))),
            other => Err(GatewayError::InvalidResponse {
                service: SERVICE,
                message: format!("destroy result: {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_data::Body;

    fn config() -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "hearth-demo".into(),
            api_key: "1234".into(),
            api_secret: "cld_secret".into(),
            folder: Some("hearth".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_sign_params_known_vector() {
        let params = BTreeMap::from([
            ("timestamp", "1700000000".to_string()),
            ("folder", "hearth".to_string()),
        ]);
        assert_eq!(
            sign_params(&params, "cld_secret"),
            "228487409b9ff018118ebf533e7663d94e70a1b49ea255f3c231e30896844fb7"
        );

        let params = BTreeMap::from([
            ("public_id", "hearth/jar".to_string()),
            ("timestamp", "1700000000".to_string()),
        ]);
        assert_eq!(
            sign_params(&params, "cld_secret"),
            "f022f222bbf682f78f00e3b639abc3189f45f7d83c66afb71544a36184ce8877"
        );
    }

    #[test]
    fn test_upload_request_shape() {
        let client = CloudinaryClient::new(config(), Duration::from_secs(15)).unwrap();
        let req = client
            .upload_request(UploadFile {
                filename: "jar.png".into(),
                content_type: "image/png".into(),
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
            })
            .unwrap();
        let req = req.request();
        assert_eq!(
            req.url(),
            "https://api.cloudinary.com/v1_1/hearth-demo/image/upload"
        );
        let Some(Body::Multipart(form)) = req.body_ref() else {
            panic!("expected a multipart body");
        };
        assert_eq!(form.field("folder"), Some("hearth"));
        assert_eq!(form.field("api_key"), Some("1234"));
        assert_eq!(form.field("signature").map(str::len), Some(64));
        assert!(form.field("timestamp").is_some());
    }

    #[test]
    fn test_unconfigured_client() {
        let client =
            CloudinaryClient::new(CloudinaryConfig::default(), Duration::from_secs(1)).unwrap();
        assert!(matches!(
            client.destroy_request("hearth/jar"),
            Err(GatewayError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_destroy_request_is_signed_form() {
        let client = CloudinaryClient::new(config(), Duration::from_secs(1)).unwrap();
        let req = client.destroy_request("hearth/jar").unwrap();
        let Some(Body::Form(fields)) = req.request().body_ref() else {
            panic!("expected a form body");
        };
        assert!(fields.iter().any(|(k, v)| k == "public_id" && v == "hearth/jar"));
        assert!(fields.iter().any(|(k, _)| k == "signature"));
        assert!(client.destroy_request(" ").is_err());
    }
}
