pub mod advisor;
pub mod build_guide_builder;
pub mod challenge_matching;
pub mod dashboard_builder;
pub mod intake;
pub mod mockup_generator;
pub mod proposal_builder;
pub mod workflow_builder;

pub use advisor::AdvisorChatUseCase;
pub use build_guide_builder::BuildGuideBuilderUseCase;
pub use dashboard_builder::DashboardBuilderUseCase;
pub use intake::IntakeUseCase;
pub use mockup_generator::MockupGeneratorUseCase;
pub use proposal_builder::ProposalBuilderUseCase;
pub use workflow_builder::WorkflowBuilderUseCase;
