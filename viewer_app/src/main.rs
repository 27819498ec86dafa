//! Headless scene viewer
//!
//! Builds a world, either imported from a model file or a procedural pair
//! of boxes, drives a few frames of commit and render against the recording
//! backend and prints the serialized scene.
//!
//! Usage: `scene_viewer [--config <file.toml|file.ron>] [model.obj]`

use clap::{Arg, ArgMatches, Command};
use scene_graph::foundation::logging;
use scene_graph::prelude::*;
use scene_graph::nodes::FILE_NAME;
use scene_graph::render::ResourceKind;
use scene_graph::scene::registry;

const FRAMES: u64 = 3;

#[derive(Debug)]
struct Args {
    config: Option<String>,
    model: Option<String>,
}

impl Args {
    fn command() -> Command {
        Command::new("scene_viewer")
            .about("Commits and renders a scene headlessly and prints its snapshot")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Scene configuration (.toml or .ron)"),
            )
            .arg(
                Arg::new("model")
                    .value_name("MODEL")
                    .help("Model file to import instead of the procedural scene"),
            )
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config: matches.get_one::<String>("config").cloned(),
            model: matches.get_one::<String>("model").cloned(),
        }
    }

    fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }
}

pub struct ViewerApp {
    config: SceneConfig,
    graph: SceneGraph,
    world: NodeId,
    backend: RecordingBackend,
    camera: Camera,
}

impl ViewerApp {
    pub fn new(config: SceneConfig, model: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut graph = SceneGraph::with_config(&config);
        let world = match model {
            Some(path) => Self::import_world(&mut graph, &config, path)?,
            None => Self::procedural_world(&mut graph)?,
        };

        Ok(Self {
            config,
            graph,
            world,
            backend: RecordingBackend::new(),
            camera: Camera::default().with_viewport(800, 600),
        })
    }

    fn import_world(
        graph: &mut SceneGraph,
        config: &SceneConfig,
        path: &str,
    ) -> Result<NodeId, Box<dyn std::error::Error>> {
        let import = config.import.clone();
        registry::register("Importer", move || {
            Box::new(Importer::with_collaborator(Box::new(ExtensionImporter::from_config(&import))))
        });

        let world = graph.create("Importer", "world")?;
        let file_name = graph.get_child(world, FILE_NAME)?;
        graph.set_value(file_name, path)?;
        log::info!("Imported {} node(s) from {path}", graph.len());
        Ok(world)
    }

    fn procedural_world(graph: &mut SceneGraph) -> Result<NodeId, Box<dyn std::error::Error>> {
        let world = graph.create("World", "world")?;
        let boxes = [
            ("box_a", Vec3::zeros(), Vec3::repeat(1.0), Vec3::new(0.8, 0.7, 0.5)),
            ("box_b", Vec3::repeat(2.0), Vec3::repeat(3.0), Vec3::new(0.3, 0.5, 0.9)),
        ];
        for (name, min, max, color) in boxes {
            let mesh = graph.create_child(world, name, "TriangleMesh")?;
            TriangleMesh::set_buffers(graph, mesh, MeshBuffers::cuboid(min, max))?;
            let material = graph.get_child(mesh, "material")?;
            let color_node = graph.get_child(material, "color")?;
            graph.set_value(color_node, color)?;
        }
        Ok(world)
    }

    pub fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        let bounds = self.graph.bounds(self.world)?;
        if bounds.is_empty() {
            log::warn!("Scene has no geometry");
        } else {
            log::info!("Scene bounds: {:?} .. {:?}", bounds.min.as_slice(), bounds.max.as_slice());
        }
        let camera = self.camera.framing(&bounds);

        for frame_index in 0..FRAMES {
            self.backend.clear_draws();
            let frame = FrameParams { frame_index, camera: camera.clone() };
            let mut ctx = RenderContext::new(&mut self.backend, frame);
            self.graph.commit(self.world, &mut ctx)?;
            self.graph.render(self.world, &mut ctx)?;
            drop(ctx);

            log::info!(
                "Frame {frame_index}: {} draw(s), {} backend object(s) created so far",
                self.backend.draws().len(),
                self.backend.total_creations()
            );

            // Spin the first mesh so later frames have something to commit
            if let Some(mesh) = self.first_mesh()? {
                let rotation = self.graph.get_child(mesh, "rotation")?;
                let angle = (frame_index + 1) as f32 * 0.25;
                self.graph.set_value(rotation, Vec3::new(0.0, 0.0, angle))?;
            }
        }
        log::info!(
            "Created {} geometries, {} materials, {} models",
            self.backend.creations(ResourceKind::Geometry),
            self.backend.creations(ResourceKind::Material),
            self.backend.creations(ResourceKind::Model)
        );

        let mut serialization = Serialization::new();
        serialization.serialize(&self.graph, self.world, self.config.serialization_mode)?;
        println!("{}", serialization.to_ron(&self.graph)?);
        Ok(())
    }

    fn first_mesh(&self) -> Result<Option<NodeId>, SceneError> {
        Ok(self
            .graph
            .children(self.world)?
            .into_iter()
            .find(|child| self.graph.behavior::<TriangleMesh>(*child).is_some()))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SceneConfig::load_from_file(path)?,
        None => SceneConfig::default(),
    };
    config.validate()?;

    logging::init_with_level(&config.log_level);
    log::info!("Starting scene viewer");

    let app = ViewerApp::new(config, args.model.as_deref())?;
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::command().try_get_matches_from(argv).map(|m| Args::from_matches(&m))
    }

    #[test]
    fn test_config_and_model() {
        let args = parse_from(&["scene_viewer", "--config", "scene.toml", "teapot.obj"]).unwrap();
        assert_eq!(args.config.as_deref(), Some("scene.toml"));
        assert_eq!(args.model.as_deref(), Some("teapot.obj"));
    }

    #[test]
    fn test_no_arguments_uses_procedural_scene() {
        let args = parse_from(&["scene_viewer"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.model.is_none());
    }

    #[test]
    fn test_unknown_flag_is_not_a_model() {
        assert!(parse_from(&["scene_viewer", "--frames", "3"]).is_err());
        let err = parse_from(&["scene_viewer", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_config_needs_a_value() {
        assert!(parse_from(&["scene_viewer", "--config"]).is_err());
    }
}
