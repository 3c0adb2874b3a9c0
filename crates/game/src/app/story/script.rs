//! Dialogue script. One table per story beat; rooms reference these from
//! their gate tables. Spoken lines keep the game's bilingual voice.

use crate::app::dialogue::Line;

pub(crate) const fn line(speaker: &'static str, text: &'static str) -> Line {
    Line { speaker, text }
}

// Objectives shown in the HUD.
pub(crate) const OBJ_FIND_LIBRARY: &str = "Busca la biblioteca. Prueba el camino del Sur.";
pub(crate) const OBJ_LIBRARY_KEY: &str = "Encuentra una llave para abrir la biblioteca.";
pub(crate) const OBJ_DO_TRIAL: &str = "Completa la Prueba extraña en el bosque del Este.";
pub(crate) const OBJ_BACK_TO_GYM: &str = "Vuelve al gimnasio por la llave.";
pub(crate) const OBJ_KEY_TO_LIBRARY: &str = "Lleva la llave de la biblioteca a la entrada.";
pub(crate) const OBJ_USE_TUNNEL: &str =
    "Usa el túnel del sótano de la cabaña para llegar a la biblioteca.";
pub(crate) const OBJ_SEALED_GATE: &str = "Encuentra el portón sellado en el bosque.";
pub(crate) const OBJ_SIGIL_TO_GABI: &str = "Regresa con Gabi con el Sigilo de Memoria.";
pub(crate) const OBJ_NORTH_GATE: &str = "Ve al norte, al portón antiguo.";
pub(crate) const OBJ_CHASE_BEAR: &str = "¡Persigue al oso!";
pub(crate) const OBJ_FACE_BEAR: &str = "Enfrenta al oso.";
pub(crate) const OBJ_FINAL_CAPTURE: &str = "Como Tony: entra, encuentra la llave, salva a June.";
pub(crate) const OBJ_JUNE_RUN: &str = "Como Tony: supera la carrera y llega a June.";
pub(crate) const OBJ_TONY_RUN: &str = "Corre a la cueva. Tony está en peligro.";
pub(crate) const OBJ_FINAL_DOOR: &str = "Abre la puerta del jefe final.";
pub(crate) const OBJ_AFTER_FINAL: &str = "Regresa con Gabi y luego vuelve a casa.";
pub(crate) const OBJ_VILLAGE: &str = "Regresa con Gabi en el centro.";
pub(crate) const OBJ_GO_HOME: &str = "Regresa a la cabaña.";
pub(crate) const OBJ_GO_HOME_FINAL: &str = "Vuelve a la cabaña.";
pub(crate) const OBJ_CAVE_NOTE: &str =
    "Encuentra la llave de la cueva y luego abre la puerta al final de la Prueba.";
pub(crate) const OBJ_CAVE_KEY: &str = "Regresa a la Prueba y abre la puerta.";
pub(crate) const OBJ_ENDING: &str = "¡Feliz Navidad!";

// --- Cabin ---

pub(crate) const CABIN_START: &[Line] = &[
    line("June", "Tony salió temprano y todavía no vuelve."),
    line("June", "Afuera el bosque está demasiado callado para mi gusto."),
    line("June", "Ok. Abrigo, botas, y a buscarlo."),
];

pub(crate) const CHRISTMAS_TREE: &[Line] = &[
    line("June", "El árbol espera. Sin adornos todavía."),
    line("June", "Primero la familia, después la decoración."),
];

pub(crate) const BASEMENT_LOCKED: &[Line] = &[line(
    "June",
    "El túnel del sótano está cerrado. ¿Dónde dejé esa llave?",
)];

pub(crate) const GIFT_NO_KEYS: &[Line] = &[line(
    "June",
    "Todavía no tenemos las llaves de esta caja de regalo.",
)];

pub(crate) const GIFT_TREE_FIRST: &[Line] =
    &[line("June", "Todavía no. Primero el árbol. Luego el regalo.")];

pub(crate) const LOCKED_GIFT: &[Line] = &[
    line("June", "Una caja de regalo con cerradura doble."),
    line("June", "Quien la envolvió no quería sorpresas anticipadas."),
];

pub(crate) const CABIN_HOMECOMING: &[Line] = &[
    line("Tony", "June... llegamos. De verdad llegamos."),
    line("June", "Sí. Y el árbol sigue desnudo. Eso se arregla ahora."),
    line("Tony", "¿Juntos?"),
    line("June", "Juntos."),
];

pub(crate) const TREE_DONE: &[Line] = &[line("June", "El árbol quedó precioso.")];

pub(crate) const GIFT_OPENED: &[Line] = &[
    line("June", "Las dos llaves giran a la vez."),
    line("Tony", "Es... todo lo que perdimos este año. Devuelto."),
    line("June", "Feliz Navidad, Tony."),
];

// --- Overworld / Gabi ---

pub(crate) const MEET_GABI: &[Line] = &[
    line("???", "No te asustes. Te estaba esperando, June."),
    line("Gabi", "Me llaman Gabi. El bosque olvida cosas, y alguien debe recordarlas."),
    line("Gabi", "Tu hermano pasó por aquí. Busca en la biblioteca, al Sur."),
];

pub(crate) const GABI_LIBRARY_HINT: &[Line] = &[line(
    "Gabi",
    "La biblioteca quizá tenga textos sobre estos símbolos...",
)];

pub(crate) const GABI_RELIC_HINT: &[Line] = &[line(
    "Gabi",
    "Usa esa Reliquia Llave para abrir el portón sellado.",
)];

pub(crate) const GABI_REVEAL: &[Line] = &[
    line("Gabi", "Trajiste el Sigilo de Memoria. Entonces ya lo sabes."),
    line("Gabriel", "Mi nombre entero es Gabriel. Guardo lo que la nieve cubre."),
    line("Gabriel", "Lleva el pesebre a casa. La historia quiere terminar bien."),
];

pub(crate) const GABI_FINAL: &[Line] = &[
    line("Gabriel", "Se acabó la sombra. El bosque respira otra vez."),
    line("Gabriel", "Vayan a casa. Los dos. El resto es de ustedes."),
];

// --- North forest ---

pub(crate) const NORTH_GATE_SEALED: &[Line] = &[
    line("June", "Ajá. Un portón enorme y ominoso. Definitivamente sellado."),
    line("June", "Si voy a entrar ahí… voy a necesitar algo... especial."),
];

pub(crate) const NORTH_GATE_CLOSED: &[Line] = &[line(
    "June",
    "El portón descansa. Lo que vivía detrás ya no está.",
)];

// --- South forest ---

pub(crate) const SOUTH_LIBRARY_LOCKED: &[Line] = &[
    line("June", "Cerrado. Claro que sí."),
    line("June", "Nada en este bosque se abre sin su llave."),
];

// --- East forest ---

pub(crate) const EAST_LAKE: &[Line] = &[
    line("June", "El lago está inmóvil. Como si contuviera la respiración."),
    line("June", "Ok, eso fue dramático. Pero… sí. Está raramente silencioso."),
];

pub(crate) const TRIAL_REFUSAL: &[Line] = &[line("June", "No. No vuelvo a hacer eso.")];

// --- West forest / Tony ---

pub(crate) const TONY_FOUND_WOODS: &[Line] = &[
    line("June", "¡Tony! ¿Qué haces tan adentro del bosque?"),
    line("Tony", "June... escuché algo entre los árboles. Algo grande."),
];

pub(crate) const TONY_BEAR_SNATCH: &[Line] = &[
    line("???", "GRRRAAAR."),
    line("Tony", "¡JUNE!"),
    line("June", "¡CORRE!"),
];

pub(crate) const TONY_HOLD_ON: &[Line] = &[line("June", "Tony… aguanta. Ya voy.")];

// --- Gym ---

pub(crate) const GYM_INTRO: &[Line] = &[
    line("June", "My gym! I haven't been here in... wow, way too long."),
    line("June", "Maybe I left something important here?"),
];

pub(crate) const GYM_LOCKER_LOCKED: &[Line] = &[
    line("June", "¿Mi casillero… está cerrado? ¿Desde cuándo?"),
    line("June", "El candado brilla igual que ese portal raro del bosque del Este."),
];

pub(crate) const GYM_KEY_TAKEN: &[Line] = &[
    line("June", "¡La llave de la biblioteca! Sabía que la había guardado aquí."),
];

// --- Animal rescue ---

pub(crate) const RESCUE_INTRO: &[Line] = &[
    line("June", "The rescue house! I volunteer here every weekend."),
    line("June", "I hope the animals are okay without me today..."),
];

pub(crate) const RESCUE_KEY_TAKEN: &[Line] = &[
    line("June", "Una llave vieja sobre el escritorio."),
    line("June", "El grabado dice SÓTANO. Como el de la cabaña."),
];

pub(crate) const PET_ANIMAL: &[Line] = &[line("June", "Mueve la cola feliz.")];

// --- Library ---

pub(crate) const PUZZLE_HINT_1: &[Line] = &[line(
    "Piedra Tallada",
    "Cuando el pino alcanza hacia la luna creciente, la estrella guía se revela.",
)];

pub(crate) const PUZZLE_HINT_2: &[Line] = &[line(
    "Nota Antigua",
    "La suma de símbolos abre el camino: PINO + LUNA = ESTRELLA. Busca el equilibrio.",
)];

pub(crate) const PUZZLE_SOLVED: &[Line] = &[
    line("June", "¡Wow! Las piedras están brillando—¡algo se está manifestando de la nada!"),
    line("June", "¿Un cofre simplemente... apareció? Ok, oficialmente más raro de lo que pensé."),
];

pub(crate) const GOT_KEY_RELIC: &[Line] = &[
    line("June", "El cofre se abre con un suspiro de polvo."),
    line("June", "Una llave enorme, tallada con los mismos símbolos del portón."),
    line("June", "La Reliquia Llave. Qué nombre tan modesto."),
];

pub(crate) const LIBRARY_SHELVES: &[Line] = &[
    line("June", "Mapas del bosque, todos con el Norte marcado en rojo."),
];

// --- Tunnel ---

pub(crate) const TUNNEL_DISCOVERY: &[Line] = &[
    line("June", "Un túnel bajo el bosque. Huele a tierra y a invierno."),
];

// --- Tony's cage / bear ---

pub(crate) const TONY_IN_CAGE: &[Line] = &[
    line("Tony", "¡June! ¡Aquí!"),
    line("June", "La jaula está floja. Dame un segundo…"),
    line("Tony", "El oso vuelve pronto. Escucha: no puedes ganarle con las manos vacías."),
];

pub(crate) const TONY_READY: &[Line] = &[line("Tony", "Estoy aquí. Ve y termina esto.")];

pub(crate) const SWORD_APPEARS: &[Line] = &[
    line("Tony", "Encontré esto entre las rocas. Creo que te estaba esperando."),
];

pub(crate) const SWORD_TAKEN: &[Line] = &[line("June", "Ok. Esto es mío ahora.")];

pub(crate) const BEAR_DOOR_LOCKED: &[Line] =
    &[line("June", "No voy a entrar ahí sin un arma.")];

// --- Final act ---

pub(crate) const FINAL_CAPTURE_SCENE: &[Line] = &[
    line("June", "El portón cede… Tony, quédate cerca."),
    line("???", "Una voz menos. Una luz menos."),
    line("Tony", "¡JUNE! ¡NO!"),
    line("Tony", "...Ok. Respira. Ahora me toca a mí."),
];

pub(crate) const FINAL_KEY_TAKEN: &[Line] = &[line("Tony", "Llaves. Listo. Ahora… June.")];

pub(crate) const FINAL_DOOR_LOCKED: &[Line] = &[line("Tony", "Cerrado. Necesito la llave.")];

pub(crate) const JUNE_CAGE_VIEW: &[Line] = &[
    line("Tony", "June está al fondo. Aguanta, hermana."),
];

pub(crate) const SHADOW_HEALING_SCENE: &[Line] = &[
    line("June", "La sombra no ruge. Tiembla."),
    line("June", "No vinimos a destruirte. Vinimos a recordarte."),
    line("La Sombra", "...recordar... duele menos de lo que pensaba."),
];

pub(crate) const VILLAGE_CELEBRATION_SCENE: &[Line] = &[
    line("Aldeana", "¡Las luces volvieron! ¡Todas a la vez!"),
    line("Tony", "June, mira. El pueblo entero salió a la nieve."),
    line("June", "Entonces terminemos esto como se debe."),
];

// --- Chase ---

pub(crate) const CHASE_INTRO: &[Line] = &[
    line("June", "Huellas enormes. Y se mueven rápido."),
    line("June", "No pares. No mires atrás."),
];

pub(crate) const CHASE_CAUGHT: &[Line] = &[line("June", "No. Otra vez. ¡MUÉVETE!")];

// --- Bosses ---

pub(crate) const BOSS_ARENA_INTRO: &[Line] = &[
    line("June", "Un claro en ruinas. Y algo con astas que no proyecta sombra."),
    line("El Ciervo", "Olvida, niña. Es más fácil."),
];

pub(crate) const BOSS_ARENA_DEFEAT: &[Line] = &[
    line("El Ciervo", "...recordar... sí. Toma el sigilo."),
    line("June", "Un Sigilo de Memoria. Gabi va a querer ver esto."),
];

pub(crate) const BEAR_BOSS_INTRO: &[Line] = &[
    line("June", "Devuélveme a mi hermano."),
];

pub(crate) const BEAR_BOSS_DEFEAT: &[Line] = &[
    line("June", "El oso huye entre los árboles. Se acabó."),
    line("Tony", "¡Mira! Soltó unas llaves doradas al correr."),
];

pub(crate) const FINAL_BOSS_INTRO: &[Line] = &[
    line("Tony", "Suelta a mi hermana."),
];

pub(crate) const FINAL_BOSS_DEFEAT: &[Line] = &[
    line("Tony", "¡June! ¿Estás bien?"),
    line("June", "Mejor que bien. Terminemos con esta sombra."),
];

// --- Trials ---

pub(crate) const TRIAL_INTRO: &[Line] = &[
    line("June", "Okay… a side-path that turns into a weird “trial.”"),
    line("June", "Fine. I can jump. I can do… whatever this is."),
];

pub(crate) const TRIAL_NEED_KEY: &[Line] = &[
    line("June", "A locked door. Great. Love that for me."),
    line("June", "There was a pipe back there… and a “cave” full of shiny things."),
    line("June", "If there’s a key, it’s probably hiding down that tube."),
];

pub(crate) const TRIAL_COMPLETE: &[Line] = &[
    line("June", "…Okay. That counted. I think."),
    line("June", "If the universe wanted me to jump around like that, it could’ve just asked."),
];

pub(crate) const POWERUP_TAKEN: &[Line] = &[
    line("June", "Ok. Me siento… un poquito más capaz."),
];

pub(crate) const CAVE_NOTE: &[Line] = &[
    line("June", "Una nota clavada en la pared de la cueva."),
    line("June", "\"La puerta del final se abre con la llave del fondo.\""),
];

pub(crate) const CAVE_KEY_TAKEN: &[Line] = &[
    line("June", "Una llavecita dorada, escondida al fondo de la cueva."),
];

// --- Title ---

pub(crate) const RESET_DONE: &[Line] = &[line("", "¡Partida reiniciada!")];
