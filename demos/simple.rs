use kro_core::analyze;

fn main() {
    let rgd = "\
apiVersion: kro.run/v1alpha1
kind: ResourceGraphDefinition
metadata:
  name: web-app
spec:
  schema:
    spec:
      image: string | default=nginx | color=blue
  resources:
    - id: deployment
      properties:
        image: ${schema.spec.image}
";

    match analyze(rgd, "web-app.yaml") {
        Ok(result) => {
            for report in result.reports() {
                eprintln!("{report:?}");
            }
            for link in result.document_links() {
                println!("link {link}");
            }
            match result.to_json() {
                Ok(json_output) => println!("Parsed document as JSON:\n{json_output}"),
                Err(e) => eprintln!("Failed to serialize: {e}"),
            }
        }
        Err(e) => {
            eprintln!("Failed to parse: {:?}", miette::Report::new(e));
        }
    }
}
