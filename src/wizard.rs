//! The three-step guided flow. Data flows forward only: location
//! summary/image -> blended composite -> video URL. Nothing here is
//! persisted; each step's output is the next step's input.

use tracing::info;

use crate::WanderResult;
use crate::asset::ImageAsset;
use crate::client::{GenClient, SearchAnswer};
use crate::compositor;
use crate::placement::Placement;

/// Instruction handed to the remote edit collaborator together with
/// the flat composite. All photorealism (lighting, shadow, blending)
/// happens there, not locally.
const BLEND_INSTRUCTION: &str = "Seamlessly blend the person into the scene. Match the \
    lighting, color temperature and grain of the background, add a natural contact shadow, \
    and keep the person's pose, face and clothing unchanged.";

/// Step 1 output: what we know about the chosen location.
#[derive(Debug)]
pub struct Discovery {
    pub answer: SearchAnswer,
    pub postcard: ImageAsset,
}

/// Step 1: grounded search for the location, then a generated
/// postcard-style image of it.
pub async fn discover(client: &GenClient, query: &str) -> WanderResult<Discovery> {
    let answer = client.grounded_search(query).await?;
    info!(references = answer.references.len(), "location found");
    let postcard = client
        .generate_image(&format!(
            "A photorealistic, postcard-worthy wide shot of {query}. Golden hour light, \
             no people in the frame."
        ))
        .await?;
    Ok(Discovery { answer, postcard })
}

/// Step 2: composite the photo into the background locally, then hand
/// the flat composite to the remote edit call for photorealistic
/// blending. The composite is the edit call's sole image input.
pub async fn place(
    client: &GenClient,
    background: &ImageAsset,
    photo: &ImageAsset,
    placement: Placement,
) -> WanderResult<ImageAsset> {
    let composite = compositor::merge(background, photo, placement)?;
    client.edit_image(&[&composite], BLEND_INSTRUCTION).await
}
