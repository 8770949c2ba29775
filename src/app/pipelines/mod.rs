pub mod declaration_pipeline;
