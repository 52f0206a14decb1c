use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use wanderframe::{
    AspectRatio, ClientConfig, GenClient, ImageAsset, Placement, PollPolicy, animate, wizard,
};

#[derive(Parser, Debug)]
#[command(name = "wanderframe", version)]
struct Cli {
    /// API key (falls back to the GEMINI_API_KEY environment variable).
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grounded search for a location; prints the answer text.
    Search(SearchArgs),
    /// Generate a location image from a text prompt.
    Imagine(ImagineArgs),
    /// Composite a photo into a background and blend it remotely.
    Place(PlaceArgs),
    /// Animate an image into a short video; prints the download URL.
    Animate(AnimateArgs),
    /// Run the full three-step flow: search, place, animate.
    Trip(TripArgs),
}

#[derive(Parser, Debug)]
struct SearchArgs {
    /// Free-text location query.
    query: String,
}

#[derive(Parser, Debug)]
struct ImagineArgs {
    /// Text prompt for the image.
    prompt: String,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlaceArgs {
    /// Background image path.
    #[arg(long)]
    background: PathBuf,

    /// Foreground photo path.
    #[arg(long)]
    photo: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Fractional anchor of the photo's center within the background.
    #[arg(long, default_value_t = 0.5)]
    anchor_x: f32,

    #[arg(long, default_value_t = 0.5)]
    anchor_y: f32,

    /// Scale multiplier on the base foreground width.
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Write the flat local composite without the remote blend pass.
    #[arg(long)]
    raw: bool,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Source image path.
    #[arg(long)]
    image: PathBuf,

    /// Motion prompt (a default is used when empty).
    #[arg(long, default_value = "")]
    prompt: String,

    /// Output orientation.
    #[arg(long, value_enum, default_value_t = AspectChoice::Landscape)]
    aspect: AspectChoice,
}

#[derive(Parser, Debug)]
struct TripArgs {
    /// Free-text location query.
    query: String,

    /// Photo of the traveller to place into the scene.
    #[arg(long)]
    photo: PathBuf,

    /// Directory for intermediate images.
    #[arg(long)]
    out_dir: PathBuf,

    /// Motion prompt for the final video (a default is used when empty).
    #[arg(long, default_value = "")]
    prompt: String,

    #[arg(long, value_enum, default_value_t = AspectChoice::Landscape)]
    aspect: AspectChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AspectChoice {
    /// 16:9
    Landscape,
    /// 9:16
    Portrait,
}

impl From<AspectChoice> for AspectRatio {
    fn from(choice: AspectChoice) -> Self {
        match choice {
            AspectChoice::Landscape => AspectRatio::Landscape,
            AspectChoice::Portrait => AspectRatio::Portrait,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = make_client(cli.api_key.as_deref())?;
    match cli.cmd {
        Command::Search(args) => cmd_search(&client, args).await,
        Command::Imagine(args) => cmd_imagine(&client, args).await,
        Command::Place(args) => cmd_place(&client, args).await,
        Command::Animate(args) => cmd_animate(&client, args).await,
        Command::Trip(args) => cmd_trip(&client, args).await,
    }
}

fn make_client(api_key: Option<&str>) -> anyhow::Result<GenClient> {
    let config = match api_key {
        Some(key) => ClientConfig::new(key),
        None => ClientConfig::from_env()
            .context("no API key: pass --api-key or set GEMINI_API_KEY")?,
    };
    Ok(GenClient::new(config)?)
}

async fn cmd_search(client: &GenClient, args: SearchArgs) -> anyhow::Result<()> {
    let answer = client.grounded_search(&args.query).await?;
    println!("{}", answer.text);
    Ok(())
}

async fn cmd_imagine(client: &GenClient, args: ImagineArgs) -> anyhow::Result<()> {
    let image = client.generate_image(&args.prompt).await?;
    image.write_to(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_place(client: &GenClient, args: PlaceArgs) -> anyhow::Result<()> {
    let background = ImageAsset::from_path(&args.background)?;
    let photo = ImageAsset::from_path(&args.photo)?;
    let placement = Placement::new(args.anchor_x, args.anchor_y, args.scale).clamped();

    let out = if args.raw {
        wanderframe::merge(&background, &photo, placement)?
    } else {
        wizard::place(client, &background, &photo, placement).await?
    };
    out.write_to(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_animate(client: &GenClient, args: AnimateArgs) -> anyhow::Result<()> {
    let image = ImageAsset::from_path(&args.image)?;
    // No interactive key-selection capability in the CLI, so classified
    // auth failures are fatal here.
    let url = animate(
        client,
        None,
        &image,
        &args.prompt,
        args.aspect.into(),
        &PollPolicy::default(),
    )
    .await?;
    println!("{url}");
    Ok(())
}

async fn cmd_trip(client: &GenClient, args: TripArgs) -> anyhow::Result<()> {
    let photo = ImageAsset::from_path(&args.photo)?;

    let discovery = wizard::discover(client, &args.query).await?;
    println!("{}", discovery.answer.text);

    let postcard_path = args.out_dir.join("postcard.png");
    discovery.postcard.write_to(&postcard_path)?;
    eprintln!("wrote {}", postcard_path.display());

    let blended = wizard::place(client, &discovery.postcard, &photo, Placement::default()).await?;
    let blended_path = args.out_dir.join("blended.png");
    blended.write_to(&blended_path)?;
    eprintln!("wrote {}", blended_path.display());

    let url = animate(
        client,
        None,
        &blended,
        &args.prompt,
        args.aspect.into(),
        &PollPolicy::default(),
    )
    .await?;
    println!("{url}");
    Ok(())
}
