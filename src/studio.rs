/**************************************************************************
  Copyright 2026 Francesco Versaci (https://github.com/fversaci/)

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
**************************************************************************/
use crate::conf::Settings;
use crate::download::fetch_image;
use crate::error::{Result, TilerError};
use crate::retry::RetryPolicy;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateImageEditRequest,
    CreateImageEditRequestArgs, CreateImageRequest, CreateImageRequestArgs, DallE2ImageSize,
    Image, ImageModel, ImageResponseFormat, ImageSize, ImagesResponse,
};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use image::DynamicImage;
use std::path::Path;
use strum_macros::Display;

/// The generative endpoints the pipeline talks to.
#[async_trait]
pub trait Studio: Send + Sync {
    /// Returns the text of a single chat completion.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
    /// Generates one square image from `prompt`.
    async fn generate(&self, prompt: &str) -> Result<DynamicImage>;
    /// Edits the PNG at `tile`, which doubles as its own mask.
    async fn edit(&self, tile: &Path, prompt: &str) -> Result<DynamicImage>;
}

#[derive(Clone, Copy, Debug, Display)]
pub enum Request {
    #[strum(serialize = "Chat completion")]
    Complete,
    #[strum(serialize = "Image generation")]
    Generate,
    #[strum(serialize = "Image edit")]
    Edit,
    #[strum(serialize = "Image download")]
    Download,
}

pub struct OpenAiStudio {
    client: Client<OpenAIConfig>,
    http: reqwest::Client,
    retry: RetryPolicy,
    text_model: String,
    image_model: ImageModel,
    edit_model: ImageModel,
    image_size: ImageSize,
    edit_size: DallE2ImageSize,
}

fn image_model(name: &str) -> ImageModel {
    match name {
        "dall-e-2" => ImageModel::DallE2,
        "dall-e-3" => ImageModel::DallE3,
        other => ImageModel::Other(other.to_string()),
    }
}

fn sizes(tile_size: u32) -> Result<(ImageSize, DallE2ImageSize)> {
    match tile_size {
        256 => Ok((ImageSize::S256x256, DallE2ImageSize::S256x256)),
        512 => Ok((ImageSize::S512x512, DallE2ImageSize::S512x512)),
        1024 => Ok((ImageSize::S1024x1024, DallE2ImageSize::S1024x1024)),
        other => Err(TilerError::InvalidSettings(format!(
            "tile size {other} is not one of 256, 512, 1024"
        ))),
    }
}

fn first_url(response: ImagesResponse) -> Result<String> {
    let image = response
        .data
        .first()
        .ok_or(TilerError::EmptyResponse("image data"))?;
    let image: &Image = image;
    match image {
        Image::Url { url, .. } => Ok(url.clone()),
        Image::B64Json { .. } => Err(TilerError::EmptyResponse("image url")),
    }
}

impl OpenAiStudio {
    pub fn new(api_key: &str, settings: &Settings) -> Result<Self> {
        let (image_size, edit_size) = sizes(settings.tile_size)?;
        let config = OpenAIConfig::new().with_api_key(api_key);
        Ok(OpenAiStudio {
            client: Client::with_config(config),
            http: reqwest::Client::new(),
            retry: settings.retry.policy(),
            text_model: settings.text_model.clone(),
            image_model: image_model(&settings.image_model),
            edit_model: image_model(&settings.edit_model),
            image_size,
            edit_size,
        })
    }

    fn chat_request(&self, system: &str, user: &str) -> Result<CreateChatCompletionRequest> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.text_model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user)
                    .build()?
                    .into(),
            ])
            .build()?;
        Ok(request)
    }

    fn generation_request(&self, prompt: &str) -> Result<CreateImageRequest> {
        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .model(self.image_model.clone())
            .n(1)
            .response_format(ImageResponseFormat::Url)
            .size(self.image_size.clone())
            .build()?;
        Ok(request)
    }

    /// The tile is sent both as the image and as its mask: its transparent
    /// pixels are the ones to fill.
    fn edit_request(&self, tile: &Path, prompt: &str) -> Result<CreateImageEditRequest> {
        let request = CreateImageEditRequestArgs::default()
            .image(tile)
            .mask(tile)
            .prompt(prompt)
            .model(self.edit_model.clone())
            .n(1)
            .response_format(ImageResponseFormat::Url)
            .size(self.edit_size.clone())
            .build()?;
        Ok(request)
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = self.chat_request(system, user)?;
        let response = self.client.chat().create(request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(TilerError::EmptyResponse("chat completion"))
    }

    async fn generation_url(&self, prompt: &str) -> Result<String> {
        let request = self.generation_request(prompt)?;
        first_url(self.client.images().create(request).await?)
    }

    async fn edit_url(&self, tile: &Path, prompt: &str) -> Result<String> {
        let request = self.edit_request(tile, prompt)?;
        first_url(self.client.images().create_edit(request).await?)
    }

    async fn download(&self, url: &str) -> Result<DynamicImage> {
        self.retry
            .run(Request::Download, || fetch_image(&self.http, url))
            .await
    }
}

#[async_trait]
impl Studio for OpenAiStudio {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        log::debug!("{} with {}", Request::Complete, self.text_model);
        self.retry
            .run(Request::Complete, || self.chat(system, user))
            .await
    }

    async fn generate(&self, prompt: &str) -> Result<DynamicImage> {
        log::debug!("{}: {prompt}", Request::Generate);
        let url = self
            .retry
            .run(Request::Generate, || self.generation_url(prompt))
            .await?;
        self.download(&url).await
    }

    async fn edit(&self, tile: &Path, prompt: &str) -> Result<DynamicImage> {
        log::debug!("{} of {}: {prompt}", Request::Edit, tile.display());
        let url = self
            .retry
            .run(Request::Edit, || self.edit_url(tile, prompt))
            .await?;
        self.download(&url).await
    }
}
