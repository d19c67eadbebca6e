use lambda_runtime::Error;
use medsent_ai::ModelKind;

#[tokio::main]
async fn main() -> Result<(), Error> {
    medsent_lambda::init_tracing();
    medsent_lambda::serve(ModelKind::Linear, "sklearn-logreg-v1").await
}
